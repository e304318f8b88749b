use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{cli::ProfileArgs, profile::ImportProfile};

pub fn execute(args: &ProfileArgs) -> Result<()> {
    let mut base = args.input.effective_profile()?;
    if !base.header {
        return Err(anyhow!("A profile skeleton needs a header line"));
    }
    // Discover the header as plain string columns.
    base.columns.clear();
    let mut cursor = args.input.open_with(&base)?;
    let headers = cursor
        .column_definitions()
        .iter()
        .map(|d| d.name().to_string())
        .collect::<Vec<_>>();
    cursor.close();

    let mut profile = ImportProfile::from_headers(&headers, cursor.delimiter(), base.locale);
    profile.encoding = base.encoding;
    profile
        .save(&args.output)
        .with_context(|| format!("Writing profile to {:?}", args.output))?;
    info!(
        "Profile with {} column(s) written to {:?}",
        profile.columns.len(),
        args.output
    );
    Ok(())
}

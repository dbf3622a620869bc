//! Startup dependency checks
//!
//! Gate execution on the version of an installed dependency (API server,
//! SDK, ...) before any unit of work runs.

use crate::error::{Error, Result};
use crate::version::{parse_requirements, parse_version, satisfies, VersionTuple};
use tracing::{debug, info};

/// Verify that `installed` satisfies `requirements`
///
/// A missing or unparsable installed version is reported the same way as an
/// unsatisfied requirement.
pub fn check_dependency(
    name: &str,
    installed: Option<&str>,
    requirements: &str,
) -> Result<VersionTuple> {
    let reqs = parse_requirements(requirements)?;

    let mismatch = |installed: &str| Error::DependencyVersion {
        name: name.to_string(),
        installed: installed.to_string(),
        required: requirements.to_string(),
    };

    let installed = installed.ok_or_else(|| mismatch("<not installed>"))?;
    let version = parse_version(installed).ok_or_else(|| mismatch(installed))?;

    if !satisfies(&version, &reqs) {
        return Err(mismatch(installed));
    }

    debug!("{} {} satisfies '{}'", name, version, requirements);
    Ok(version)
}

/// Run a set of `(name, installed, requirements)` checks, stopping at the first failure
pub fn check_dependencies<'a, I>(checks: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>, &'a str)>,
{
    for (name, installed, requirements) in checks {
        check_dependency(name, installed, requirements)?;
    }
    info!("Dependency checks passed");
    Ok(())
}

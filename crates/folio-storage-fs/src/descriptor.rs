//! Category descriptor parsing.

use serde::Deserialize;

use folio_storage::CategoryDescriptor;

/// On-disk shape of a descriptor file.
///
/// Unknown keys are ignored so descriptors shared with other tooling
/// (`collapsed`, `link`, ...) still load.
#[derive(Deserialize)]
struct DescriptorFile {
    tab_group: Option<String>,
    label: Option<String>,
    position: Option<f64>,
}

/// Parse a descriptor for the directory at `dir` (relative, `/`-joined).
pub(crate) fn parse_descriptor(
    dir: String,
    content: &str,
) -> Result<CategoryDescriptor, serde_json::Error> {
    let file: DescriptorFile = serde_json::from_str(content)?;
    Ok(CategoryDescriptor {
        path: dir,
        tab_group: file.tab_group,
        label: file.label,
        position: file.position,
    })
}

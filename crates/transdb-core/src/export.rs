//! Export pipeline: a stored domain back to interchange files.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::resolver::Resolver;
use crate::store::Store;
use crate::xliff;

/// Write one interchange file per language present in domain `name`.
///
/// Fails with `NotFound` if the domain does not exist. A domain without any
/// translation produces no files.
pub fn export_domain(
    store: &Store,
    resolver: &Resolver,
    name: &str,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let domain_id = resolver.lookup_domain(store, name)?;
    let tree = store.load_domain_tree(domain_id, name)?;

    let mut written = Vec::new();
    for language in tree.languages() {
        let file = tree.to_domain_file(&language);
        written.push(xliff::write_file(&file, output_dir)?);
    }

    info!(
        domain = name,
        files = written.len(),
        dir = %output_dir.display(),
        "domain exported"
    );
    Ok(written)
}

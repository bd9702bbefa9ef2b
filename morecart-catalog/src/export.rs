use crate::listing::{CSV_HEADER, ProductListing};
use morecart_common::{Result, ScrapeError};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write a header row plus one row per listing.
///
/// The header is written even when `listings` is empty.
pub fn write_listings<W: Write>(writer: W, listings: &[ProductListing]) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for listing in listings {
        wtr.serialize(listing)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write `listings` to it.
pub fn write_listings_file(path: &Path, listings: &[ProductListing]) -> Result<()> {
    let file = File::create(path).map_err(|source| ScrapeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_listings(file, listings).map_err(|source| ScrapeError::Output {
        path: path.to_path_buf(),
        source,
    })
}

//! Common, IO-related code.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use flate2::{bufread::MultiGzDecoder, write::GzEncoder, Compression};

use crate::err::PgxError;

fn is_gz<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz"))
}

/// Transparently open a file with gzip decoder.
///
/// A missing file yields `PgxError::NotFound`, any other problem `PgxError::Processing`.
pub fn open_read_maybe_gz<P>(path: P) -> Result<Box<dyn BufRead>, PgxError>
where
    P: AsRef<Path>,
{
    if !path.as_ref().exists() {
        return Err(PgxError::NotFound(path.as_ref().to_path_buf()));
    }
    let file = File::open(path.as_ref()).map_err(PgxError::processing)?;
    if is_gz(&path) {
        tracing::trace!("Opening {:?} as gzip for reading", path.as_ref());
        let decoder = MultiGzDecoder::new(BufReader::new(file));
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        tracing::trace!("Opening {:?} as plain text for reading", path.as_ref());
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Transparently open a file with gzip encoder.
pub fn open_write_maybe_gz<P>(path: P) -> Result<Box<dyn Write>, anyhow::Error>
where
    P: AsRef<Path>,
{
    if is_gz(&path) {
        tracing::trace!("Opening {:?} as gzip for writing", path.as_ref());
        let file = File::create(path)?;
        let bufwriter = BufWriter::new(file);
        let encoder = GzEncoder::new(bufwriter, Compression::default());
        Ok(Box::new(encoder))
    } else {
        tracing::trace!("Opening {:?} as plain text for writing", path.as_ref());
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

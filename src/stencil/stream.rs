//! Serialisasi stream: raw footprint bytes, tanpa header atau length prefix.
//!
//! Schema (composite) harus diketahui writer dan reader di luar stream.

use std::io::{self, Read, Write};
use std::sync::Arc;

use tracing::{debug, warn};

use super::region::OwnedRegion;
use super::view::Stencil;
use crate::config::StencilConfig;
use crate::error::{Result, StencilError};
use crate::layout::Composite;

impl Stencil<'static> {
    /// Alokasi region baru lalu baca tepat `footprint` bytes dari `reader`.
    ///
    /// Stream yang habis lebih awal menghasilkan `ShortRead` dan region
    /// langsung dilepas. Tidak ada retry.
    pub fn from_reader<R: Read + ?Sized>(layout: Arc<Composite>, reader: &mut R) -> Result<Self> {
        Self::from_reader_with_config(layout, reader, StencilConfig::default())
    }

    pub fn from_reader_with_config<R: Read + ?Sized>(
        layout: Arc<Composite>,
        reader: &mut R,
        config: StencilConfig,
    ) -> Result<Self> {
        let expected = layout.footprint();
        let mut region = OwnedRegion::allocate(expected, config.fill)?;

        let actual = fill_from(reader, region.as_mut_slice())?;
        if actual < expected {
            warn!(
                composite = layout.name(),
                expected, actual, "short read while loading stencil"
            );
            return Err(StencilError::ShortRead { expected, actual });
        }

        debug!(composite = layout.name(), bytes = expected, "stencil loaded");
        Ok(Stencil::from_owned(layout, config, region))
    }
}

impl Stencil<'_> {
    /// Tulis tepat `footprint` bytes isi region ke `writer`
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let bytes = self.as_bytes()?;
        writer.write_all(bytes)?;
        debug!(
            composite = self.layout().name(),
            bytes = bytes.len(),
            "stencil written"
        );
        Ok(())
    }

    /// Timpa isi region dengan `footprint` bytes dari `reader`.
    ///
    /// Saat `ShortRead`, sebagian region mungkin sudah tertimpa.
    pub fn read_from<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<()> {
        let buf = self.bytes_mut()?;
        let expected = buf.len();
        let actual = fill_from(reader, buf)?;
        if actual < expected {
            warn!(expected, actual, "short read while refreshing stencil");
            return Err(StencilError::ShortRead { expected, actual });
        }
        Ok(())
    }
}

/// Baca sampai `buf` penuh atau EOF. Mengembalikan jumlah byte terbaca.
///
/// `Interrupted` dilanjutkan seperti `Read::read_exact`.
fn fill_from<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

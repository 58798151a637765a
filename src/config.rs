//! Konfigurasi stencil

/// Mode pengecekan tipe saat akses field by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Bytes di-reinterpret sebagai `T` tanpa cek tipe (kontrak caller).
    #[default]
    Unchecked,
    /// Tipe `T` harus sama dengan tipe yang dideklarasikan field.
    Checked,
}

/// Isi awal region hasil alokasi baru.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillPolicy {
    #[default]
    Zeroed,
    /// Semua byte diisi dengan pola ini (berguna untuk debug).
    Pattern(u8),
}

/// Stencil configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StencilConfig {
    pub access: AccessMode,
    pub fill: FillPolicy,
}

impl StencilConfig {
    pub fn with_access(mut self, access: AccessMode) -> Self {
        self.access = access;
        self
    }

    pub fn with_fill(mut self, fill: FillPolicy) -> Self {
        self.fill = fill;
        self
    }

    /// Konfigurasi dengan cek tipe aktif
    pub fn checked() -> Self {
        Self::default().with_access(AccessMode::Checked)
    }
}

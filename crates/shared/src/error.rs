use thiserror::Error;

use crate::dates::DATE_INPUT_HINT;

/// Recoverable input problems. The message is what the user is shown before
/// being asked for the same step again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Format salah. Gunakan {}", DATE_INPUT_HINT)]
    InvalidDate,
    #[error("Tidak ditemukan. Coba kata kunci lain atau pilih dari daftar.")]
    NoMatch,
    #[error("Hasil terlalu banyak ({count}, maksimal {limit}). Persempit kata kunci.")]
    TooManyMatches { count: usize, limit: usize },
    #[error("Pilihan tidak dikenali. Silakan gunakan tombol yang tersedia.")]
    UnknownSelection,
    #[error("Isian tidak boleh kosong.")]
    EmptyField,
}

//! In-process persistence adapters.
//!
//! State lives for the lifetime of the process only. Each store guards its
//! table and secondary index with a single [`std::sync::RwLock`]; no lock is
//! held across an `.await`.

mod memory_transcription_repository;
mod memory_user_repository;

pub use memory_transcription_repository::MemoryTranscriptionRepository;
pub use memory_user_repository::MemoryUserRepository;

// Common test utilities and fixtures

pub mod helpers;

// Re-export commonly used items
// Note: not every test binary uses every helper
#[allow(unused_imports)]
pub use fixtures::{docx_bytes, pdf_bytes, DataDir};
#[allow(unused_imports)]
pub use helpers::{FakeChatModel, FakeEmbedder, TestEnv, FAKE_DIMENSIONS};

pub mod fakes;
pub mod sqlite;
pub mod tank;

pub use fakes::{FakeInventory, FakeLayoutStore, RecordingNotifier};
pub use sqlite::SqliteFixture;
pub use tank::{creature, decoration, TestTank, FRAME_MS, START_MS};

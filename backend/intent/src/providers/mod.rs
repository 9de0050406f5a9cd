pub mod mock;
pub mod openai;

pub use mock::MockChatProvider;
pub use openai::OpenAiProvider;

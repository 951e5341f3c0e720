pub mod gemini_client;

pub use gemini_client::{
    parse_data_uri, GeminiClient, GenerateContentRequest, GenerationConfig, Part,
};

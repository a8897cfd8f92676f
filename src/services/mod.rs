pub mod prompt_builder;

pub use prompt_builder::{
    build_conversion_prompt, build_generation_prompt, format_source, question_schema,
};

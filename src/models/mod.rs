pub mod question;
pub mod source;

pub use question::{AnswerOption, GeneratedQuestion};
pub use source::{QuestionOrder, QuizSource, SourceFile, SourceKind, SourcePage};

use serde::{Deserialize, Serialize};

/// 素材类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// 用户输入的主题
    Topic,
    /// 从文件中提取的文本
    File,
    /// 待转换的既有题目列表文本
    Converter,
}

/// 素材分页顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionOrder {
    /// 保持原始顺序
    Sequential,
    /// 随机打乱顺序
    Mixed,
}

/// 素材中的一页文本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePage {
    /// 页码（从 1 开始）
    pub page: u32,
    /// 该页已提取好的纯文本
    pub text: String,
}

/// 一份素材文件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// 文件名（用于在提示词中标注出处）
    pub name: String,
    /// 按页拆分的文本
    pub pages: Vec<SourcePage>,
}

/// 出题素材
///
/// 文本提取（PDF/DOCX 解析）由上层完成，这里只拿到纯文本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSource {
    /// 素材文件列表；主题类素材只有一个单页"文件"
    pub files: Vec<SourceFile>,
    /// 素材类型
    pub kind: SourceKind,
    /// 素材标题（用于展示，不参与提示词）
    pub title: String,
}

impl QuizSource {
    /// 从主题字符串构造素材
    pub fn from_topic(topic: impl Into<String>) -> Self {
        let topic = topic.into();
        Self {
            files: vec![SourceFile {
                name: "主题".to_string(),
                pages: vec![SourcePage {
                    page: 1,
                    text: topic.clone(),
                }],
            }],
            kind: SourceKind::Topic,
            title: topic,
        }
    }

    /// 从文件列表构造素材
    pub fn from_files(files: Vec<SourceFile>, title: impl Into<String>) -> Self {
        Self {
            files,
            kind: SourceKind::File,
            title: title.into(),
        }
    }

    /// 从待转换的题目列表文本构造素材
    pub fn from_question_list(file: SourceFile) -> Self {
        let title = format!("转换: {}", file.name);
        Self {
            files: vec![file],
            kind: SourceKind::Converter,
            title,
        }
    }
}

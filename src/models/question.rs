use serde::{Deserialize, Serialize};

/// 单个选项
///
/// 上游模型以 camelCase 返回字段，这里统一映射
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    /// 选项内容
    pub text: String,
    /// 是否为正确选项（每道题有且只有一个）
    pub is_correct: bool,
    /// 该选项正确或错误的详细解析
    #[serde(default)]
    pub explanation: String,
}

/// 生成的题目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    /// 本地分配的唯一标识，不来自上游
    #[serde(default)]
    pub id: String,
    /// 题目所属主题
    #[serde(default)]
    pub topic: String,
    /// 题干
    pub question: String,
    /// 选项列表（预期 4 个）
    pub options: Vec<AnswerOption>,
    /// 出处说明（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guideline: Option<String>,
}

impl GeneratedQuestion {
    /// 校验题目是否满足基本形状要求
    ///
    /// 要求：题干非空、选项列表非空、恰好一个正确选项。
    /// 不满足的题目直接丢弃，不做修复
    pub fn is_valid(&self) -> bool {
        if self.question.trim().is_empty() {
            return false;
        }
        if self.options.is_empty() {
            return false;
        }
        self.options.iter().filter(|opt| opt.is_correct).count() == 1
    }
}

impl std::fmt::Display for GeneratedQuestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 截断题干以便日志显示（最多80个字符）
        let preview = crate::utils::truncate_text(&self.question, 80);
        write!(f, "[{}] {}", self.topic, preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(is_correct: bool) -> AnswerOption {
        AnswerOption {
            text: "选项".to_string(),
            is_correct,
            explanation: "解析".to_string(),
        }
    }

    fn question_with_options(options: Vec<AnswerOption>) -> GeneratedQuestion {
        GeneratedQuestion {
            id: String::new(),
            topic: "测试".to_string(),
            question: "题干".to_string(),
            options,
            guideline: None,
        }
    }

    #[test]
    fn test_valid_question() {
        let q = question_with_options(vec![
            option(false),
            option(true),
            option(false),
            option(false),
        ]);
        assert!(q.is_valid());
    }

    #[test]
    fn test_no_correct_option_is_invalid() {
        let q = question_with_options(vec![option(false), option(false)]);
        assert!(!q.is_valid());
    }

    #[test]
    fn test_multiple_correct_options_is_invalid() {
        let q = question_with_options(vec![option(true), option(true)]);
        assert!(!q.is_valid());
    }

    #[test]
    fn test_empty_options_is_invalid() {
        let q = question_with_options(vec![]);
        assert!(!q.is_valid());
    }

    #[test]
    fn test_blank_question_is_invalid() {
        let mut q = question_with_options(vec![option(true)]);
        q.question = "   ".to_string();
        assert!(!q.is_valid());
    }

    #[test]
    fn test_deserialize_camel_case_fields() {
        let json = r#"{
            "topic": "心血管",
            "question": "下列哪项是高血压的一线用药？",
            "guideline": "来源: 第3页",
            "options": [
                {"text": "A", "isCorrect": true, "explanation": "正确"},
                {"text": "B", "isCorrect": false, "explanation": "错误"}
            ]
        }"#;

        let q: GeneratedQuestion = serde_json::from_str(json).unwrap();
        assert!(q.id.is_empty());
        assert!(q.options[0].is_correct);
        assert!(!q.options[1].is_correct);
        assert_eq!(q.guideline.as_deref(), Some("来源: 第3页"));
    }
}

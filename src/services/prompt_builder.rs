//! 提示词构建 - 业务能力层
//!
//! 纯函数式地把素材、数量、自定义要求与已知题目拼装成提示词。
//! 相同输入永远产出相同的提示词字符串；唯一带随机性的步骤是
//! 素材分页的乱序排列，随机源由调用方注入，便于测试时播种

use crate::models::{QuestionOrder, QuizSource, SourceKind};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value};

/// 把素材格式化为提示词中的参考文本
///
/// # 参数
/// - `source`: 素材
/// - `order`: 分页顺序（`Mixed` 时使用注入的随机源做洗牌）
/// - `rng`: 随机源
///
/// 文件素材会展平为"[文件: 名称, 页码: N]: 正文"的分块，
/// 转换素材保持原始顺序并只标注页码，主题素材原样透传
pub fn format_source(source: &QuizSource, order: QuestionOrder, rng: &mut impl Rng) -> String {
    match source.kind {
        SourceKind::Converter => {
            let Some(file) = source.files.first() else {
                return String::new();
            };
            file.pages
                .iter()
                .map(|p| format!("[页码: {}]: {}", p.page, p.text))
                .collect::<Vec<_>>()
                .join("\n\n")
        }
        SourceKind::File => {
            let mut chunks: Vec<String> = source
                .files
                .iter()
                .flat_map(|file| {
                    file.pages.iter().map(move |page| {
                        format!("[文件: {}, 页码: {}]: {}", file.name, page.page, page.text)
                    })
                })
                .collect();
            if order == QuestionOrder::Mixed {
                chunks.shuffle(rng);
            }
            chunks.join("\n\n")
        }
        SourceKind::Topic => source
            .files
            .first()
            .and_then(|f| f.pages.first())
            .map(|p| p.text.clone())
            .unwrap_or_default(),
    }
}

/// 构建一个批次的出题提示词
///
/// # 参数
/// - `content`: 已格式化的参考文本
/// - `batch_count`: 本批期望的题目数量
/// - `instructions`: 用户自定义要求（可为空）
/// - `known_questions`: 已知题干列表（来自之前的批次或既有题库），用于去重
/// - `kind`: 素材类型，决定附加哪条可靠性规则
pub fn build_generation_prompt(
    content: &str,
    batch_count: usize,
    instructions: &str,
    known_questions: &[String],
    kind: SourceKind,
) -> String {
    // 基础指令：有自定义要求时优先遵循要求，否则直接依据素材出题
    let mut prompt = if !instructions.is_empty() {
        format!(
            "你是一位出题专家。请以提供的参考文本为依据，你的首要任务是遵循以下具体要求出 {} 道题: \"{}\"。参考文本为: \"{}\"。",
            batch_count, instructions, content
        )
    } else {
        format!(
            "你是一位出题专家。请根据以下主题或文本出 {} 道题: \"{}\"。",
            batch_count, content
        )
    };

    // 去重条款：逐字列出所有已知题干
    if !known_questions.is_empty() {
        let summary = known_questions.join("; ");
        prompt.push_str(&format!(
            "\n\n关键规则: 生成的题目必须是全新的、与已有题目明显不同的题目。\
            不得生成与下列题目相同或高度相似的变体: \"{}\"。请仔细核对，避免任何重复。",
            summary
        ));
    }

    prompt.push(' ');
    prompt.push_str(reliability_rules(kind));
    prompt.push(' ');
    prompt.push_str(FORMAT_RULES);

    prompt
}

/// 构建一个批次的题目列表转换提示词
///
/// # 参数
/// - `full_text`: 已格式化的完整素材文本
/// - `start_index`: 本批从第几道题开始转录（从 1 开始）
/// - `count`: 本批转录的题目数量
pub fn build_conversion_prompt(full_text: &str, start_index: usize, count: usize) -> String {
    format!(
        "你是一位精通文档分析与教育内容制作的 AI 助手。你的任务是把一份试卷文本\
        转换为结构化的 JSON 格式，并以最高精度遵循下面的要求。\
        回复必须是一个 JSON 对象数组，每个对象代表一道题，符合此结构: \
        {{ \"topic\": \"string\", \"question\": \"string\", \"options\": \
        [ {{ \"text\": \"string\", \"isCorrect\": boolean, \"explanation\": \"string\" }} ], \
        \"guideline\": \"string\" }}。\n\
        要求如下:\n\
        \"{}\"\n\
        请从下面提供的完整文本中，从第 {} 题开始，处理并转录 {} 道题。\n\
        完整文本:\n\"{}\"",
        CONVERSION_RULES, start_index, count, full_text
    )
}

/// 期望的响应结构描述，随请求发给网关
pub fn question_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "topic": { "type": "STRING" },
                "question": { "type": "STRING" },
                "options": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "text": { "type": "STRING" },
                            "isCorrect": { "type": "BOOLEAN" },
                            "explanation": { "type": "STRING" }
                        },
                        "required": ["text", "isCorrect", "explanation"]
                    }
                },
                "guideline": { "type": "STRING" }
            },
            "required": ["topic", "question", "options"]
        }
    })
}

/// 按素材类型返回可靠性规则文本
fn reliability_rules(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::File => FILE_RELIABILITY_RULES,
        SourceKind::Topic => TOPIC_RELIABILITY_RULES,
        SourceKind::Converter => BASE_RELIABILITY_RULES,
    }
}

/// 通用可靠性规则
const BASE_RELIABILITY_RULES: &str = "如果主题与医学相关，请聚焦对学生和从业者有价值的临床、\
    病理生理和药理学要点。所有信息必须可靠且正确，请务必核实，并尽量给出信息来源\
    （优先使用科学论文、教科书和权威学会指南，始终注明来源及其获取途径）。\
    如果主题与医学无关，同样要尽最大努力保证信息可靠，给出与主题对应的真实来源，\
    并说明用户可以在哪里查证这些信息。";

/// 文件素材附加规则：要求在出处字段中标注文件与页码
const FILE_RELIABILITY_RULES: &str = "如果主题与医学相关，请聚焦对学生和从业者有价值的临床、\
    病理生理和药理学要点。所有信息必须可靠且正确，请务必核实，并尽量给出信息来源\
    （优先使用科学论文、教科书和权威学会指南，始终注明来源及其获取途径）。\
    如果主题与医学无关，同样要尽最大努力保证信息可靠，给出与主题对应的真实来源，\
    并说明用户可以在哪里查证这些信息。\
    提供的文本已按来源标注了文件名和页码（如 [文件: xxx.pdf, 页码: X]: 正文）。\
    生成题目时，'guideline' 字段必须注明信息出自哪个文件的第几页，\
    格式为\"来源: 文件 xxx.pdf 第 X 页\"。";

/// 主题素材附加规则：涉及精确条文时要求从严
const TOPIC_RELIABILITY_RULES: &str = "如果主题与医学相关，请聚焦对学生和从业者有价值的临床、\
    病理生理和药理学要点。所有信息必须可靠且正确，请务必核实，并尽量给出信息来源\
    （优先使用科学论文、教科书和权威学会指南，始终注明来源及其获取途径）。\
    如果主题与医学无关，同样要尽最大努力保证信息可靠，给出与主题对应的真实来源，\
    并说明用户可以在哪里查证这些信息。\
    如果用户的主题涉及法律条文检索，例如法条编号、法规代码等极其具体的信息，\
    必须格外小心，避免给出错误或不准确的内容。只有当多个最新的权威资料\
    （选择出版年份最接近当前的）完全一致时才可以引用该信息。\
    例如：如果无法确定某条信息到底出自第 51 条还是第 64 条，就不要写出条号。\
    尽可能精确地注明来源，但凡对法条编号存疑，一律不写。\
    再次强调，只给出你有十足把握、完全正确且最新的信息。";

/// 输出格式规则
const FORMAT_RULES: &str = "对每道题，请按 JSON 格式提供以下字段: 'topic'、'question'、\
    'guideline'（可选，一条出处说明），以及一个 'options' 数组。'options' 数组必须包含 4 个对象。\
    每个选项对象必须有: 'text'（选项内容）、'isCorrect'（布尔值，唯一正确选项为 true，\
    其余为 false）和 'explanation'（该选项为何正确或错误的详细解析）。\
    务必让每个选项对象的 'explanation' 与该对象自身的 'text' 直接对应，\
    解释这个选项本身为何正确或错误。";

/// 转换模式的详细要求
const CONVERSION_RULES: &str = "你的任务是把文件中的题目转录为测验格式。\n\
    关键要求:\n\
    1. 忠实转录: 题目和选项必须与文件中完全一致，保持原始顺序。\n\
    2. 答案分析: 先仔细检查文件中是否附有答案（正确选项列表）。\
    如果找到答案，用它来标记每道题的正确选项；\
    如果没有答案，你需要依据自己的专业知识解答每道题，确定正确选项并标记 isCorrect: true。\n\
    3. 完整解析: 对标记为正确的选项（无论来自答案还是你的分析），\
    在 'explanation' 字段给出详细有用的解析；错误选项的 'explanation' 留空字符串。\n\
    4. 纠错与排版: 只修正明显的排版或录入错误为最可能的词，不改变题干或选项的含义。\n\
    5. 页码标注: 始终在 'guideline' 字段注明题目提取自文件的第几页。";

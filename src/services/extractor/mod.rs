//! 结构抽取服务 - 业务能力层
//!
//! 同一段文本交给三种版式解析器各自完整扫描一遍，再由选择策略挑出一组结果
//! （默认：题块最多者；并列时按 bold → heading → lettered 取先者）。
//! 不合并不同解析器的结果。

pub mod bold;
pub mod heading;
pub mod lettered;
pub mod provenance;

use crate::models::question::{MAX_OPTIONS, MIN_OPTIONS};
use crate::models::raw_block::{BlockFormat, Provenance, RawBlock};

pub use bold::BoldFormat;
pub use heading::HeadingFormat;
pub use lettered::LetteredFormat;
pub use provenance::detect_provenance;

/// 选项文本至少要有的字符数
const MIN_OPTION_CHARS: usize = 3;

/// 单一版式的解析器
pub trait FormatExtractor: Send + Sync {
    fn format(&self) -> BlockFormat;

    /// 扫描整段文本，返回能识别出的全部完整题块
    fn extract(&self, text: &str) -> Vec<RawBlock>;
}

/// 某个解析器的抽取结果
#[derive(Debug, Clone)]
pub struct ExtractionCandidate {
    pub format: BlockFormat,
    pub blocks: Vec<RawBlock>,
}

/// 在多个解析结果中选出一个
pub trait SelectionPolicy: Send + Sync {
    /// 返回被选中结果的索引；没有候选时返回 None
    fn select(&self, candidates: &[ExtractionCandidate]) -> Option<usize>;
}

/// 题块最多者胜出，并列取先者
#[derive(Debug, Clone, Copy, Default)]
pub struct MostBlocks;

impl SelectionPolicy for MostBlocks {
    fn select(&self, candidates: &[ExtractionCandidate]) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (i, candidate) in candidates.iter().enumerate() {
            let count = candidate.blocks.len();
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((i, count));
            }
        }
        best.map(|(i, _)| i)
    }
}

/// 结构抽取器
pub struct StructuralExtractor {
    extractors: Vec<Box<dyn FormatExtractor>>,
    policy: Box<dyn SelectionPolicy>,
}

impl StructuralExtractor {
    pub fn new(
        extractors: Vec<Box<dyn FormatExtractor>>,
        policy: Box<dyn SelectionPolicy>,
    ) -> Self {
        Self { extractors, policy }
    }

    /// 运行所有解析器，返回每个解析器的结果（顺序与注册顺序一致）
    pub fn candidates(&self, text: &str) -> Vec<ExtractionCandidate> {
        self.extractors
            .iter()
            .map(|e| ExtractionCandidate {
                format: e.format(),
                blocks: e.extract(text),
            })
            .collect()
    }

    /// 抽取题块并附上来源信息
    ///
    /// 三种解析器都没有结果时返回空列表，不视为错误
    pub fn extract(&self, text: &str, provenance: &Provenance) -> Vec<RawBlock> {
        let mut candidates = self.candidates(text);
        let Some(index) = self.policy.select(&candidates) else {
            return Vec::new();
        };

        let chosen = candidates.swap_remove(index);
        tracing::debug!(
            "版式选择: {} ({} 个题块)",
            chosen.format.name(),
            chosen.blocks.len()
        );

        chosen
            .blocks
            .into_iter()
            .map(|mut block| {
                block.provenance = provenance.clone();
                block
            })
            .collect()
    }
}

impl Default for StructuralExtractor {
    fn default() -> Self {
        Self::new(
            vec![
                Box::new(BoldFormat),
                Box::new(HeadingFormat),
                Box::new(LetteredFormat),
            ],
            Box::new(MostBlocks),
        )
    }
}

/// 逐行扫描时累积题干和选项
pub(crate) struct BlockBuilder {
    format: BlockFormat,
    current: Option<String>,
    options: Vec<String>,
    blocks: Vec<RawBlock>,
}

impl BlockBuilder {
    pub(crate) fn new(format: BlockFormat) -> Self {
        Self {
            format,
            current: None,
            options: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// 结束上一题，开始新题
    pub(crate) fn start(&mut self, stem: &str) {
        self.flush();
        self.current = Some(stem.to_string());
    }

    /// 结束上一题，且之后的选项不归属任何题目
    pub(crate) fn reset(&mut self) {
        self.flush();
    }

    pub(crate) fn push_option(&mut self, text: &str) {
        if self.current.is_none() {
            return;
        }
        let text = text.trim();
        if text.chars().count() >= MIN_OPTION_CHARS {
            self.options.push(text.to_string());
        }
    }

    fn flush(&mut self) {
        let options = std::mem::take(&mut self.options);
        if let Some(stem) = self.current.take() {
            if !stem.is_empty() && options.len() >= MIN_OPTIONS {
                self.blocks.push(RawBlock {
                    raw_text: stem,
                    raw_options: options.into_iter().take(MAX_OPTIONS).collect(),
                    format: self.format,
                    provenance: Provenance::default(),
                });
            }
        }
    }

    pub(crate) fn finish(mut self) -> Vec<RawBlock> {
        self.flush();
        self.blocks
    }
}

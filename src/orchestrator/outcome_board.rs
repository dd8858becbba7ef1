//! 答案看板 - 编排层
//!
//! 保存最近一次取答案的全部结果。每次发布整体替换，不与上一次合并。

use crate::models::AnswerOutcome;

/// 答案看板
///
/// 只有编排器写入；展示层和自动填写只读。
#[derive(Debug, Default)]
pub struct OutcomeBoard {
    outcomes: Vec<AnswerOutcome>,
    generation: u64,
}

impl OutcomeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用新一轮的结果替换全部内容
    ///
    /// 结果按 `question_index` 排序后保存，同一下标只保留一条。
    pub fn publish(&mut self, mut outcomes: Vec<AnswerOutcome>) {
        outcomes.sort_by_key(|o| o.question_index);
        outcomes.dedup_by_key(|o| o.question_index);
        self.outcomes = outcomes;
        self.generation += 1;
    }

    /// 丢弃上一轮的结果，不算新的一轮
    pub fn clear(&mut self) {
        self.outcomes.clear();
    }

    /// 某道题的结果，本轮还没有结果时为 None
    pub fn get(&self, question_index: usize) -> Option<&AnswerOutcome> {
        self.outcomes
            .binary_search_by_key(&question_index, |o| o.question_index)
            .ok()
            .map(|pos| &self.outcomes[pos])
    }

    pub fn outcomes(&self) -> &[AnswerOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// 已发布的轮数
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 成功拿到答案的题数
    pub fn answered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_ok()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerStatus;

    fn ok(index: usize, text: &str) -> AnswerOutcome {
        AnswerOutcome::new(
            index,
            AnswerStatus::Ok {
                answer_text: text.into(),
            },
        )
    }

    #[test]
    fn test_publish_replaces_previous_run() {
        let mut board = OutcomeBoard::new();
        board.publish(vec![ok(0, "A"), ok(1, "B")]);
        assert_eq!(board.len(), 2);
        assert_eq!(board.generation(), 1);

        board.publish(vec![AnswerOutcome::new(0, AnswerStatus::Empty), ok(1, "C")]);
        assert_eq!(board.len(), 2);
        assert_eq!(board.generation(), 2);
        assert_eq!(board.get(0).unwrap().status, AnswerStatus::Empty);
        assert_eq!(board.get(1).unwrap().answer_text(), Some("C"));
        assert_eq!(board.answered(), 1);
    }

    #[test]
    fn test_clear_drops_outcomes_keeps_generation() {
        let mut board = OutcomeBoard::new();
        board.publish(vec![ok(0, "A")]);
        board.clear();
        assert!(board.is_empty());
        assert!(board.get(0).is_none());
        assert_eq!(board.answered(), 0);
        assert_eq!(board.generation(), 1);
    }

    #[test]
    fn test_lookup_by_index_and_duplicates() {
        let mut board = OutcomeBoard::new();
        board.publish(vec![ok(2, "x"), ok(0, "y"), ok(2, "z")]);
        assert_eq!(board.len(), 2);
        assert_eq!(board.get(0).unwrap().answer_text(), Some("y"));
        assert!(board.get(1).is_none());
        assert!(board.get(2).is_some());
    }
}

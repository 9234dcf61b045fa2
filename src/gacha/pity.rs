use crate::entities::Rarity;

use super::rarity;

/// 保底状态机（每个 (user, banner) 一份）。
/// counter 为连续未出 SSR+ 的次数；连续 threshold-1 次失手后，
/// 下一抽（即总第 threshold 抽）强制走 SSR+ 子集抽取，
/// 保证任意连续 threshold 抽内至少一次 SSR+。结果登记后：
/// 命中保底目标档清零，否则 +1。
/// 批次内逐抽前馈：第 k 抽的结果影响第 k+1 抽是否强制。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PityState {
    pub counter: i32,
}

impl PityState {
    pub fn new(counter: i32) -> Self {
        Self {
            counter: counter.max(0),
        }
    }

    /// 本抽是否强制保底（本抽是连续第 counter+1 抽，落在第 threshold 抽上兜底）
    pub fn is_forced(&self, threshold: i32) -> bool {
        self.counter + 1 >= threshold
    }

    /// 登记一抽的最终稀有度（含库存兜底替换后的结果）
    pub fn record(&mut self, rarity: Rarity) {
        if rarity::is_pity_target(rarity) {
            self.counter = 0;
        } else {
            self.counter += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gacha::probability::Distribution;
    use crate::gacha::testing::SeqRng;
    use crate::gacha::{BATCH_SIZE, DrawRng};

    const THRESHOLD: i32 = 10;

    #[test]
    fn test_counter_resets_only_on_pity_target() {
        let mut pity = PityState::new(5);
        pity.record(Rarity::Common);
        assert_eq!(pity.counter, 6);
        pity.record(Rarity::Epic);
        assert_eq!(pity.counter, 7);
        pity.record(Rarity::Ssr);
        assert_eq!(pity.counter, 0);

        let mut pity = PityState::new(9);
        pity.record(Rarity::Legendary);
        assert_eq!(pity.counter, 0);
    }

    #[test]
    fn test_forced_when_next_draw_hits_threshold() {
        // counter = T-1 意味着本抽是连续第 T 抽，必须兜底
        assert!(!PityState::new(THRESHOLD - 2).is_forced(THRESHOLD));
        assert!(PityState::new(THRESHOLD - 1).is_forced(THRESHOLD));
        assert!(PityState::new(THRESHOLD).is_forced(THRESHOLD));
    }

    #[test]
    fn test_negative_counter_clamped() {
        assert_eq!(PityState::new(-2).counter, 0);
    }

    fn sample_pool() -> Vec<(i64, Rarity, i32)> {
        vec![
            (1, Rarity::Common, 100),
            (2, Rarity::Rare, 100),
            (3, Rarity::Epic, 100),
            (4, Rarity::Ssr, 100),
            (5, Rarity::Legendary, 100),
        ]
    }

    /// 模拟批内抽取循环（与 DrawEngine 的顺序逻辑一致）
    fn run_batch(
        dist: &Distribution,
        pity: &mut PityState,
        rng: &mut dyn DrawRng,
        count: u32,
    ) -> Vec<(Rarity, bool)> {
        let mut outcomes = Vec::new();
        for _ in 0..count {
            let forced = pity.is_forced(THRESHOLD);
            let drawn = if forced {
                dist.draw_min_rank(crate::gacha::rarity::min_pity_rank(), rng)
                    .unwrap()
            } else {
                dist.draw(rng)
            };
            pity.record(drawn.rarity);
            outcomes.push((drawn.rarity, forced));
        }
        outcomes
    }

    /// 入批 counter=9: 第1抽即整体连续第 10 抽，强制 SSR+ 并清零，
    /// 其后恢复常规权重且 counter 从 0 爬到 9（若一直不出 SSR+）。
    #[test]
    fn test_batch_with_counter_nine_forces_first_draw() {
        let dist = Distribution::build(&sample_pool()).unwrap();
        let mut pity = PityState::new(9);

        // 脚本: 第1抽强制 (SSR+ 子集 roll 0 -> ssr, 档内 roll 0)，
        // 其后 9 抽均 roll 0 -> common
        let mut rolls = vec![0u32, 0];
        for _ in 0..9 {
            rolls.extend([0, 0]);
        }
        let mut rng = SeqRng::new(&rolls);

        let outcomes = run_batch(&dist, &mut pity, &mut rng, BATCH_SIZE);
        assert_eq!(outcomes.len(), 10);
        assert_eq!(outcomes[0], (Rarity::Ssr, true));
        for o in &outcomes[1..] {
            assert_eq!(*o, (Rarity::Common, false));
        }
        assert_eq!(pity.counter, 9);
    }

    /// 阈值 T、入批 counter=C: 前 T-C-1 抽不出 SSR+ 时
    /// 第 T-C 抽（整体连续第 T 抽）强制
    #[test]
    fn test_pity_threshold_property_mid_batch() {
        let dist = Distribution::build(&sample_pool()).unwrap();
        let mut pity = PityState::new(7);

        // 前 2 抽 common (T-C-1 = 2)，第 3 抽即整体第 10 抽强制，之后常规
        let rolls = [0u32, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let mut rng = SeqRng::new(&rolls);

        let outcomes = run_batch(&dist, &mut pity, &mut rng, BATCH_SIZE);
        assert!(!outcomes[0].1 && !outcomes[1].1);
        assert_eq!(outcomes[2], (Rarity::Ssr, true));
        for o in &outcomes[3..] {
            assert!(!o.1);
        }
        // 第3抽清零后剩余 7 抽 common
        assert_eq!(pity.counter, 7);
    }

    /// 自然 SSR 也清零且不触发强制
    #[test]
    fn test_natural_ssr_resets_counter_without_forcing() {
        let dist = Distribution::build(&sample_pool()).unwrap();
        let mut pity = PityState::new(8);

        // 第1抽自然命中 ssr (roll 9600 ∈ [9500, 9900))，之后 2 抽 common
        let mut rng = SeqRng::new(&[9600, 0, 0, 0, 0, 0]);
        let outcomes = run_batch(&dist, &mut pity, &mut rng, 3);
        assert_eq!(outcomes[0], (Rarity::Ssr, false));
        assert_eq!(pity.counter, 2);
    }
}

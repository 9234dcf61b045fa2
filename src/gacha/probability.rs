use std::collections::HashSet;

use crate::entities::Rarity;
use crate::error::{AppError, AppResult};

use super::DrawRng;
use super::rarity::{RARITY_TIERS, TOTAL_BP};

/// 卡池内单个奖品条目（档内权重）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PoolEntry {
    prize_id: i64,
    weight: u32,
}

/// 稀有度档位桶：cumulative_bp 为半开区间上界，
/// roll ∈ [上一档 cumulative, 本档 cumulative) 即命中本档。
#[derive(Debug, Clone)]
struct TierBucket {
    rarity: Rarity,
    probability_bp: u32,
    cumulative_bp: u32,
    entries: Vec<PoolEntry>,
    weight_sum: u32,
}

/// 一次抽取结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drawn {
    pub prize_id: i64,
    pub rarity: Rarity,
}

/// 某个卡池的累积概率分布。
/// 两段式抽取: 先按档位全局 bp 选稀有度，再按档内权重选具体奖品。
#[derive(Debug, Clone)]
pub struct Distribution {
    buckets: Vec<TierBucket>,
}

impl Distribution {
    /// 由卡池启用条目构建分布。
    /// 校验: 每个全局概率非零的档位必须有条目且权重和为正，
    /// 条目权重必须 > 0，累积概率必须恰好收敛到 10000bp。
    pub fn build(entries: &[(i64, Rarity, i32)]) -> AppResult<Self> {
        if entries.is_empty() {
            return Err(AppError::MisconfiguredPrizePool(
                "prize pool has no active entries".to_string(),
            ));
        }

        let mut buckets = Vec::with_capacity(RARITY_TIERS.len());
        let mut cumulative = 0u32;

        for tier in RARITY_TIERS.iter() {
            let mut tier_entries = Vec::new();
            for (prize_id, rarity, weight) in entries.iter() {
                if *rarity != tier.rarity {
                    continue;
                }
                if *weight <= 0 {
                    return Err(AppError::MisconfiguredPrizePool(format!(
                        "prize {prize_id} has non-positive weight {weight}"
                    )));
                }
                tier_entries.push(PoolEntry {
                    prize_id: *prize_id,
                    weight: *weight as u32,
                });
            }

            let weight_sum: u32 = tier_entries.iter().map(|e| e.weight).sum();
            if tier.probability_bp > 0 && weight_sum == 0 {
                return Err(AppError::MisconfiguredPrizePool(format!(
                    "rarity tier {} has no active entries",
                    tier.rarity
                )));
            }

            cumulative += tier.probability_bp;
            buckets.push(TierBucket {
                rarity: tier.rarity,
                probability_bp: tier.probability_bp,
                cumulative_bp: cumulative,
                entries: tier_entries,
                weight_sum,
            });
        }

        // 静态档位配置恒为 10000bp，此处防配置表意外改动
        if cumulative != TOTAL_BP {
            return Err(AppError::MisconfiguredPrizePool(format!(
                "tier probabilities sum to {cumulative}bp, expected {TOTAL_BP}bp"
            )));
        }

        Ok(Self { buckets })
    }

    /// 常规抽取: [0, 10000) 均匀 roll 落入的档位命中（半开区间，
    /// 边界值归下一档），再在档内按权重二次抽取。
    pub fn draw(&self, rng: &mut dyn DrawRng) -> Drawn {
        let roll = rng.roll(TOTAL_BP);
        let bucket = self
            .buckets
            .iter()
            .find(|b| roll < b.cumulative_bp)
            .unwrap_or_else(|| &self.buckets[self.buckets.len() - 1]);
        Drawn {
            prize_id: Self::pick_entry(bucket, rng),
            rarity: bucket.rarity,
        }
    }

    /// 保底强制抽取: 仅在 rank >= min_rank 的档位子集内抽取，
    /// 档位概率按子集重新归一化。
    pub fn draw_min_rank(&self, min_rank: u8, rng: &mut dyn DrawRng) -> AppResult<Drawn> {
        let subset: Vec<&TierBucket> = self
            .buckets
            .iter()
            .filter(|b| b.rarity.rank() >= min_rank)
            .collect();
        let total: u32 = subset.iter().map(|b| b.probability_bp).sum();
        if total == 0 {
            return Err(AppError::MisconfiguredPrizePool(format!(
                "no tiers at rank >= {min_rank} to force a pity draw"
            )));
        }

        let roll = rng.roll(total);
        let mut acc = 0u32;
        let mut chosen = subset[subset.len() - 1];
        for b in subset.iter().copied() {
            acc += b.probability_bp;
            if roll < acc {
                chosen = b;
                break;
            }
        }
        Ok(Drawn {
            prize_id: Self::pick_entry(chosen, rng),
            rarity: chosen.rarity,
        })
    }

    /// 同档换抽（排除已售罄奖品），档内无可用条目返回 None
    pub fn draw_in_tier(
        &self,
        rarity: Rarity,
        excluded: &HashSet<i64>,
        rng: &mut dyn DrawRng,
    ) -> Option<i64> {
        let bucket = self.buckets.iter().find(|b| b.rarity == rarity)?;
        Self::pick_entry_excluding(bucket, excluded, rng)
    }

    /// 兜底抽取: 从最低的仍有可用条目的档位按权重抽取
    pub fn draw_fallback(&self, excluded: &HashSet<i64>, rng: &mut dyn DrawRng) -> Option<Drawn> {
        for bucket in &self.buckets {
            if let Some(prize_id) = Self::pick_entry_excluding(bucket, excluded, rng) {
                return Some(Drawn {
                    prize_id,
                    rarity: bucket.rarity,
                });
            }
        }
        None
    }

    /// 各档位有效概率 (bp)，供展示与校验
    pub fn tier_probabilities(&self) -> Vec<(Rarity, u32)> {
        self.buckets
            .iter()
            .map(|b| (b.rarity, b.probability_bp))
            .collect()
    }

    fn pick_entry(bucket: &TierBucket, rng: &mut dyn DrawRng) -> i64 {
        let roll = rng.roll(bucket.weight_sum);
        let mut acc = 0u32;
        let mut chosen = bucket.entries[bucket.entries.len() - 1].prize_id;
        for e in &bucket.entries {
            acc += e.weight;
            if roll < acc {
                chosen = e.prize_id;
                break;
            }
        }
        chosen
    }

    fn pick_entry_excluding(
        bucket: &TierBucket,
        excluded: &HashSet<i64>,
        rng: &mut dyn DrawRng,
    ) -> Option<i64> {
        let available: Vec<&PoolEntry> = bucket
            .entries
            .iter()
            .filter(|e| !excluded.contains(&e.prize_id))
            .collect();
        let weight_sum: u32 = available.iter().map(|e| e.weight).sum();
        if weight_sum == 0 {
            return None;
        }

        let roll = rng.roll(weight_sum);
        let mut acc = 0u32;
        let mut chosen = available[available.len() - 1].prize_id;
        for e in &available {
            acc += e.weight;
            if roll < acc {
                chosen = e.prize_id;
                break;
            }
        }
        Some(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gacha::testing::SeqRng;

    /// 五档齐全的样例卡池:
    /// common: 1 (w70), 2 (w30); rare: 3; epic: 4 (w50), 5 (w50);
    /// ssr: 6; legendary: 7
    fn sample_pool() -> Vec<(i64, Rarity, i32)> {
        vec![
            (1, Rarity::Common, 70),
            (2, Rarity::Common, 30),
            (3, Rarity::Rare, 100),
            (4, Rarity::Epic, 50),
            (5, Rarity::Epic, 50),
            (6, Rarity::Ssr, 100),
            (7, Rarity::Legendary, 100),
        ]
    }

    #[test]
    fn test_build_tier_probabilities_sum_to_total() {
        let dist = Distribution::build(&sample_pool()).unwrap();
        let tiers = dist.tier_probabilities();
        let sum: u32 = tiers.iter().map(|(_, bp)| bp).sum();
        assert_eq!(sum, TOTAL_BP);
        assert_eq!(tiers[0], (Rarity::Common, 6000));
        assert_eq!(tiers[4], (Rarity::Legendary, 100));
    }

    #[test]
    fn test_build_rejects_empty_pool() {
        let err = Distribution::build(&[]).unwrap_err();
        assert!(matches!(err, AppError::MisconfiguredPrizePool(_)));
    }

    #[test]
    fn test_build_rejects_missing_tier() {
        // 缺 legendary 档
        let mut pool = sample_pool();
        pool.retain(|(_, r, _)| *r != Rarity::Legendary);
        let err = Distribution::build(&pool).unwrap_err();
        assert!(matches!(err, AppError::MisconfiguredPrizePool(_)));
    }

    #[test]
    fn test_build_rejects_non_positive_weight() {
        let mut pool = sample_pool();
        pool.push((8, Rarity::Common, 0));
        let err = Distribution::build(&pool).unwrap_err();
        assert!(matches!(err, AppError::MisconfiguredPrizePool(_)));
    }

    #[test]
    fn test_draw_boundaries_are_half_open() {
        let dist = Distribution::build(&sample_pool()).unwrap();
        // 累积: common 6000, rare 8500, epic 9500, ssr 9900, legendary 10000
        // roll 5999 归 common，边界 6000 归 rare
        let mut rng = SeqRng::new(&[5999, 0]);
        assert_eq!(dist.draw(&mut rng).rarity, Rarity::Common);
        let mut rng = SeqRng::new(&[6000, 0]);
        assert_eq!(dist.draw(&mut rng).rarity, Rarity::Rare);
        let mut rng = SeqRng::new(&[9899, 0]);
        assert_eq!(dist.draw(&mut rng).rarity, Rarity::Ssr);
        let mut rng = SeqRng::new(&[9900, 0]);
        assert_eq!(dist.draw(&mut rng).rarity, Rarity::Legendary);
        let mut rng = SeqRng::new(&[9999, 0]);
        assert_eq!(dist.draw(&mut rng).rarity, Rarity::Legendary);
    }

    #[test]
    fn test_draw_second_stage_uses_entry_weights() {
        let dist = Distribution::build(&sample_pool()).unwrap();
        // common 档内 [0,70) -> 奖品1, [70,100) -> 奖品2
        let mut rng = SeqRng::new(&[0, 69]);
        assert_eq!(
            dist.draw(&mut rng),
            Drawn {
                prize_id: 1,
                rarity: Rarity::Common
            }
        );
        let mut rng = SeqRng::new(&[0, 70]);
        assert_eq!(
            dist.draw(&mut rng),
            Drawn {
                prize_id: 2,
                rarity: Rarity::Common
            }
        );
    }

    #[test]
    fn test_min_rank_draw_renormalizes_subset() {
        let dist = Distribution::build(&sample_pool()).unwrap();
        // SSR+ 子集: ssr 400bp + legendary 100bp = 500
        let mut rng = SeqRng::new(&[399, 0]);
        let drawn = dist.draw_min_rank(Rarity::Ssr.rank(), &mut rng).unwrap();
        assert_eq!(drawn.rarity, Rarity::Ssr);
        let mut rng = SeqRng::new(&[400, 0]);
        let drawn = dist.draw_min_rank(Rarity::Ssr.rank(), &mut rng).unwrap();
        assert_eq!(drawn.rarity, Rarity::Legendary);
    }

    #[test]
    fn test_draw_in_tier_respects_exclusions() {
        let dist = Distribution::build(&sample_pool()).unwrap();
        let mut excluded = HashSet::new();
        excluded.insert(4i64);
        // epic 档排除 4 后只剩 5
        let mut rng = SeqRng::new(&[0]);
        assert_eq!(dist.draw_in_tier(Rarity::Epic, &excluded, &mut rng), Some(5));

        excluded.insert(5);
        let mut rng = SeqRng::new(&[]);
        assert_eq!(dist.draw_in_tier(Rarity::Epic, &excluded, &mut rng), None);
    }

    #[test]
    fn test_fallback_picks_lowest_available_tier() {
        let dist = Distribution::build(&sample_pool()).unwrap();
        let mut excluded: HashSet<i64> = [1, 2].into_iter().collect();
        // common 档抽干后兜底落到 rare
        let mut rng = SeqRng::new(&[0]);
        let drawn = dist.draw_fallback(&excluded, &mut rng).unwrap();
        assert_eq!(
            drawn,
            Drawn {
                prize_id: 3,
                rarity: Rarity::Rare
            }
        );

        // 全部抽干则 None
        excluded.extend([3, 4, 5, 6, 7]);
        let mut rng = SeqRng::new(&[]);
        assert!(dist.draw_fallback(&excluded, &mut rng).is_none());
    }

    #[test]
    fn test_seeded_rng_draws_are_reproducible() {
        use crate::gacha::RandDrawRng;
        use rand::SeedableRng;

        let dist = Distribution::build(&sample_pool()).unwrap();
        let mut a = RandDrawRng(rand::rngs::StdRng::seed_from_u64(42));
        let mut b = RandDrawRng(rand::rngs::StdRng::seed_from_u64(42));
        for _ in 0..100 {
            assert_eq!(dist.draw(&mut a), dist.draw(&mut b));
        }
    }
}

use crate::entities::Rarity;

/// 概率使用 basis points (bp) 形式，1% = 100bp, 100% = 10000bp
pub const TOTAL_BP: u32 = 10_000;

/// 稀有度档位全局配置（静态只读，所有卡池共用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RarityTier {
    pub rarity: Rarity,
    /// 档位全局概率 (bp)
    pub probability_bp: u32,
    /// 保底目标档（保底强制抽 "SSR 或更高"）
    pub is_pity_target: bool,
}

/// 按价值升序:
/// - COMMON    60%   -> 6000bp
/// - RARE      25%   -> 2500bp
/// - EPIC      10%   -> 1000bp
/// - SSR        4%   ->  400bp (保底目标)
/// - LEGENDARY  1%   ->  100bp (保底目标)
pub const RARITY_TIERS: [RarityTier; 5] = [
    RarityTier {
        rarity: Rarity::Common,
        probability_bp: 6000,
        is_pity_target: false,
    },
    RarityTier {
        rarity: Rarity::Rare,
        probability_bp: 2500,
        is_pity_target: false,
    },
    RarityTier {
        rarity: Rarity::Epic,
        probability_bp: 1000,
        is_pity_target: false,
    },
    RarityTier {
        rarity: Rarity::Ssr,
        probability_bp: 400,
        is_pity_target: true,
    },
    RarityTier {
        rarity: Rarity::Legendary,
        probability_bp: 100,
        is_pity_target: true,
    },
];

pub fn tier(rarity: Rarity) -> &'static RarityTier {
    &RARITY_TIERS[rarity.rank() as usize]
}

pub fn probability_bp(rarity: Rarity) -> u32 {
    tier(rarity).probability_bp
}

pub fn is_pity_target(rarity: Rarity) -> bool {
    tier(rarity).is_pity_target
}

/// 保底强制抽取的最低稀有度等级（即最低的 pity target 档）
pub fn min_pity_rank() -> u8 {
    RARITY_TIERS
        .iter()
        .find(|t| t.is_pity_target)
        .map(|t| t.rarity.rank())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_sum_to_total_bp() {
        let sum: u32 = RARITY_TIERS.iter().map(|t| t.probability_bp).sum();
        assert_eq!(sum, TOTAL_BP);
    }

    #[test]
    fn test_tiers_are_indexed_by_rank() {
        for (i, t) in RARITY_TIERS.iter().enumerate() {
            assert_eq!(t.rarity.rank() as usize, i);
            assert_eq!(tier(t.rarity), t);
        }
    }

    #[test]
    fn test_pity_targets_are_ssr_and_above() {
        assert!(!is_pity_target(Rarity::Common));
        assert!(!is_pity_target(Rarity::Rare));
        assert!(!is_pity_target(Rarity::Epic));
        assert!(is_pity_target(Rarity::Ssr));
        assert!(is_pity_target(Rarity::Legendary));
        assert_eq!(min_pity_rank(), Rarity::Ssr.rank());
    }
}

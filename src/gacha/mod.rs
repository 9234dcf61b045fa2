pub mod pity;
pub mod probability;
pub mod rarity;

pub use pity::PityState;
pub use probability::{Distribution, Drawn};

/// 十连批次大小（产品规则固定，不接受用户输入）
pub const BATCH_SIZE: u32 = 10;

/// 注入式随机源: roll(bound) 返回 [0, bound) 上的均匀整数。
/// 生产环境用 RandDrawRng 包装 rand；测试用脚本化实现保证结果可复现。
pub trait DrawRng {
    fn roll(&mut self, bound: u32) -> u32;
}

pub struct RandDrawRng<R: rand::Rng>(pub R);

impl<R: rand::Rng> DrawRng for RandDrawRng<R> {
    fn roll(&mut self, bound: u32) -> u32 {
        self.0.random_range(0..bound)
    }
}

/// 线程本地随机源（每次调用临时取 rand::rng()）
pub fn thread_draw_rng() -> RandDrawRng<rand::rngs::ThreadRng> {
    RandDrawRng(rand::rng())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::DrawRng;
    use std::collections::VecDeque;

    /// 按脚本逐个吐出 roll 结果，用尽则 panic（测试用）
    pub struct SeqRng {
        rolls: VecDeque<u32>,
    }

    impl SeqRng {
        pub fn new(rolls: &[u32]) -> Self {
            Self {
                rolls: rolls.iter().copied().collect(),
            }
        }
    }

    impl DrawRng for SeqRng {
        fn roll(&mut self, bound: u32) -> u32 {
            let v = self.rolls.pop_front().expect("SeqRng script exhausted");
            assert!(v < bound, "scripted roll {v} out of bound {bound}");
            v
        }
    }
}

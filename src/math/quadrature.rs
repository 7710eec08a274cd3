//! Gauss–Legendre quadrature on [-1, 1].
//!
//! Nodes are stored as the positive half only; each node is used at `±x`.
//! The three rules (6, 12 and 20 points) are the ones Genz's bivariate normal
//! algorithm switches between, and the 20-point rule also backs the composite
//! integrator used for the Debye function.

pub const GL6_NODES: [f64; 3] = [0.932_469_514_203_152_2, 0.661_209_386_466_264_5, 0.238_619_186_083_197];
pub const GL6_WEIGHTS: [f64; 3] = [0.171_324_492_379_170_5, 0.360_761_573_048_138_4, 0.467_913_934_572_690_4];

pub const GL12_NODES: [f64; 6] = [
    0.981_560_634_246_719_1,
    0.904_117_256_370_475,
    0.769_902_674_194_305,
    0.587_317_954_286_617_1,
    0.367_831_498_998_180_2,
    0.125_233_408_511_469_2,
];
pub const GL12_WEIGHTS: [f64; 6] = [
    0.047_175_336_386_511_77,
    0.106_939_325_995_318_3,
    0.160_078_328_543_346_4,
    0.203_167_426_723_065_9,
    0.233_492_536_538_354_7,
    0.249_147_045_813_402_9,
];

pub const GL20_NODES: [f64; 10] = [
    0.993_128_599_185_094_9,
    0.963_971_927_277_913_8,
    0.912_234_428_251_325_9,
    0.839_116_971_822_218_8,
    0.746_331_906_460_150_8,
    0.636_053_680_726_515,
    0.510_867_001_950_827_1,
    0.373_706_088_715_419_6,
    0.227_785_851_141_645_1,
    0.076_526_521_133_497_33,
];
pub const GL20_WEIGHTS: [f64; 10] = [
    0.017_614_007_139_152_12,
    0.040_601_429_800_386_94,
    0.062_672_048_334_109_06,
    0.083_276_741_576_704_75,
    0.101_930_119_817_240_4,
    0.118_194_531_961_518_4,
    0.131_688_638_449_176_6,
    0.142_096_109_318_382_1,
    0.149_172_986_472_603_7,
    0.152_753_387_130_725_9,
];

/// Integrate `f` over `[a, b]` with `panels` equal sub-intervals, each using
/// the 20-point Gauss–Legendre rule.
pub fn integrate<F>(f: F, a: f64, b: f64, panels: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let panels = panels.max(1);
    let width = (b - a) / panels as f64;
    let mut total = 0.0;
    for p in 0..panels {
        let lo = a + width * p as f64;
        let mid = lo + width / 2.0;
        let half = width / 2.0;
        let mut s = 0.0;
        for (&x, &w) in GL20_NODES.iter().zip(GL20_WEIGHTS.iter()) {
            s += w * (f(mid + half * x) + f(mid - half * x));
        }
        total += s * half;
    }
    total
}

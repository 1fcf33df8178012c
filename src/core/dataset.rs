//! Bundled annual return history used when the caller does not inject its own
//! data source. Equity and bond series are total returns; inflation is CPI.

use super::history::{AssetClassSeries, CorrelationMatrix, HistoricalData};
use super::types::AssetClass;

// 1928-2025
const US_EQUITY: [f64; 98] = [
    0.4381, -0.0830, -0.2512, -0.4384, -0.0864, 0.4998, -0.0119, 0.4674, 0.3194, -0.3534,
    0.2928, -0.0110, -0.1067, -0.1277, 0.1917, 0.2551, 0.1936, 0.3623, -0.0807, 0.0548,
    0.0570, 0.1830, 0.3081, 0.2368, 0.1815, -0.0121, 0.5256, 0.3260, 0.0744, -0.1046,
    0.4372, 0.1206, 0.0034, 0.2664, -0.0881, 0.2261, 0.1642, 0.1240, -0.0997, 0.2380,
    0.1081, -0.0850, 0.0401, 0.1431, 0.1898, -0.1466, -0.2647, 0.3720, 0.2384, -0.0718,
    0.0656, 0.1861, 0.3242, -0.0491, 0.2155, 0.2256, 0.0627, 0.3173, 0.1867, 0.0525,
    0.1661, 0.3169, -0.0310, 0.3047, 0.0762, 0.1008, 0.0132, 0.3758, 0.2296, 0.3336,
    0.2858, 0.2104, -0.0910, -0.1189, -0.2210, 0.2869, 0.1088, 0.0491, 0.1579, 0.0549,
    -0.3700, 0.2646, 0.1506, 0.0211, 0.1600, 0.3239, 0.1369, 0.0138, 0.1196, 0.2183,
    -0.0438, 0.3149, 0.1840, 0.2861, -0.1811, 0.2629, 0.2506, 0.2400,
];

// 1928-2025
const BONDS: [f64; 98] = [
    0.0084, 0.0342, 0.0454, -0.0256, 0.0879, 0.0186, 0.0796, 0.0498, 0.0551, 0.0002,
    0.0580, 0.0494, 0.0540, -0.0202, 0.0529, 0.0291, 0.0258, 0.0380, 0.0313, -0.0078,
    0.0192, 0.0445, 0.0006, 0.0043, 0.0294, 0.0439, -0.0139, -0.0065, 0.0656, 0.0745,
    -0.0610, -0.0226, 0.1368, 0.0096, 0.0569, 0.0118, 0.0351, 0.0071, -0.0165, -0.0092,
    0.0326, -0.0508, 0.1675, 0.0979, 0.0268, 0.0367, 0.0416, 0.0919, -0.0012, 0.0140,
    -0.0078, -0.0118, -0.0395, 0.0185, 0.4026, 0.0068, 0.1543, 0.3097, 0.2430, -0.0296,
    0.0967, 0.1821, -0.0803, 0.1590, 0.0789, 0.1824, -0.0777, 0.2355, 0.0092, 0.1264,
    0.1492, -0.0825, 0.1666, 0.0557, 0.1512, 0.0201, 0.0451, 0.0287, 0.0196, 0.1000,
    0.2022, -0.1112, 0.0784, 0.1646, 0.0297, -0.0917, 0.1075, 0.0089, 0.0069, 0.0227,
    -0.0002, 0.0892, 0.1121, -0.0439, -0.1746, 0.0396, -0.0200, 0.0150,
];

// 1970-2025
const INTL_EQUITY: [f64; 56] = [
    -0.1090, 0.2970, 0.3690, -0.1450, 0.3560, 0.0330, 0.0260, 0.1840, 0.3240, 0.0490,
    0.2280, -0.0230, -0.0170, 0.2370, 0.0740, 0.5630, 0.6920, 0.2460, 0.2820, 0.1050,
    -0.2340, 0.1220, -0.1210, 0.3260, 0.0780, 0.1120, 0.0610, 0.0200, 0.2000, 0.2700,
    -0.1420, -0.2140, -0.1590, 0.3880, 0.2030, 0.1380, 0.2650, 0.1160, -0.4320, 0.3190,
    0.0780, -0.1200, 0.1720, 0.2290, -0.0480, -0.0080, 0.0100, 0.2500, -0.1350, 0.2220,
    0.0780, 0.1150, -0.1430, 0.1830, 0.0400, 0.0500,
];

// 1972-2025
const GOLD: [f64; 54] = [
    0.4980, 0.7280, -0.2460, -0.2500, -0.0410, 0.2310, 0.3720, 1.2630, -0.3250, -0.3270,
    0.1490, -0.1640, -0.1930, 0.0560, 0.2180, 0.2220, -0.1530, -0.0220, -0.0180, -0.1040,
    -0.0570, 0.1760, -0.0200, 0.0100, -0.0460, -0.2120, -0.0080, 0.0050, -0.0570, 0.0200,
    0.2480, 0.1980, 0.0530, 0.1820, 0.2310, 0.3110, 0.0510, 0.2380, 0.2970, 0.1010,
    0.0700, -0.2830, -0.0170, -0.1050, 0.0860, 0.1310, -0.0150, 0.1830, 0.2490, -0.0360,
    -0.0070, 0.1320, 0.2700, 0.1000,
];

// 1972-2025
const REITS: [f64; 54] = [
    0.0820, -0.1550, -0.2140, 0.1920, 0.4760, 0.2230, -0.0350, 0.3590, 0.2410, 0.0620,
    0.2190, 0.3060, 0.2090, 0.1920, 0.1210, -0.0380, 0.1370, 0.0870, -0.1530, 0.3570,
    0.1430, 0.1950, 0.0310, 0.1530, 0.3550, 0.2030, -0.1740, 0.2650, 0.2670, 0.1330,
    0.0360, 0.3720, 0.3110, 0.1220, 0.3540, -0.1560, -0.3790, 0.2800, 0.2790, 0.0830,
    0.1950, 0.0250, 0.2820, 0.0250, 0.0850, 0.0510, -0.0420, 0.2890, -0.0520, 0.4090,
    -0.2550, 0.1160, 0.0800, 0.0600,
];

// 2011-2025
const CRYPTO: [f64; 15] = [
    14.5000, 1.8600, 54.4000, -0.5800, 0.3500, 1.2400, 13.0000, -0.7300, 0.9500, 3.0500,
    0.5950, -0.6450, 1.5600, 1.2100, 0.4000,
];

// 1928-2025
const INFLATION: [f64; 98] = [
    -0.0097, 0.0020, -0.0603, -0.0952, -0.1027, 0.0076, 0.0203, 0.0299, 0.0121, 0.0288,
    -0.0202, 0.0000, 0.0096, 0.0972, 0.0929, 0.0316, 0.0211, 0.0225, 0.1802, 0.0871,
    0.0271, -0.0180, 0.0579, 0.0587, 0.0088, 0.0062, -0.0050, 0.0037, 0.0286, 0.0302,
    0.0176, 0.0150, 0.0148, 0.0067, 0.0122, 0.0165, 0.0119, 0.0192, 0.0335, 0.0304,
    0.0472, 0.0611, 0.0549, 0.0336, 0.0341, 0.0862, 0.1231, 0.0694, 0.0486, 0.0677,
    0.0903, 0.1331, 0.1240, 0.0894, 0.0383, 0.0379, 0.0395, 0.0391, 0.0113, 0.0441,
    0.0442, 0.0465, 0.0610, 0.0306, 0.0290, 0.0275, 0.0267, 0.0254, 0.0332, 0.0170,
    0.0161, 0.0268, 0.0339, 0.0155, 0.0238, 0.0188, 0.0326, 0.0342, 0.0254, 0.0408,
    0.0009, 0.0272, 0.0150, 0.0296, 0.0174, 0.0150, 0.0076, 0.0073, 0.0207, 0.0213,
    0.0191, 0.0231, 0.0125, 0.0700, 0.0650, 0.0340, 0.0290, 0.0250,
];

const CORRELATIONS: [(AssetClass, AssetClass, f64); 15] = [
    (AssetClass::UsEquity, AssetClass::Bonds, 0.05),
    (AssetClass::UsEquity, AssetClass::IntlEquity, 0.85),
    (AssetClass::UsEquity, AssetClass::Gold, 0.02),
    (AssetClass::UsEquity, AssetClass::Reits, 0.65),
    (AssetClass::UsEquity, AssetClass::Crypto, 0.30),
    (AssetClass::Bonds, AssetClass::IntlEquity, 0.15),
    (AssetClass::Bonds, AssetClass::Gold, 0.25),
    (AssetClass::Bonds, AssetClass::Reits, 0.20),
    (AssetClass::Bonds, AssetClass::Crypto, -0.10),
    (AssetClass::IntlEquity, AssetClass::Gold, 0.10),
    (AssetClass::IntlEquity, AssetClass::Reits, 0.55),
    (AssetClass::IntlEquity, AssetClass::Crypto, 0.25),
    (AssetClass::Gold, AssetClass::Reits, 0.15),
    (AssetClass::Gold, AssetClass::Crypto, 0.20),
    (AssetClass::Reits, AssetClass::Crypto, 0.20),
];

pub const INFLATION_FIRST_YEAR: i32 = 1928;

pub fn builtin_correlation() -> CorrelationMatrix {
    let mut matrix = CorrelationMatrix::new();
    for (a, b, rho) in CORRELATIONS {
        // Constants above are all within [-1, 1].
        let _ = matrix.set(a, b, rho);
    }
    matrix
}

impl HistoricalData {
    /// US equity, bonds, international, gold, REITs and bitcoin annual
    /// returns with CPI inflation and the 1972-2024 correlation matrix.
    pub fn builtin() -> Self {
        HistoricalData::new(INFLATION.to_vec(), builtin_correlation())
            .with_series(AssetClassSeries::new(
                AssetClass::UsEquity,
                1928,
                US_EQUITY.to_vec(),
            ))
            .with_series(AssetClassSeries::new(AssetClass::Bonds, 1928, BONDS.to_vec()))
            .with_series(AssetClassSeries::new(
                AssetClass::IntlEquity,
                1970,
                INTL_EQUITY.to_vec(),
            ))
            .with_series(AssetClassSeries::new(AssetClass::Gold, 1972, GOLD.to_vec()))
            .with_series(AssetClassSeries::new(AssetClass::Reits, 1972, REITS.to_vec()))
            .with_series(AssetClassSeries::new(
                AssetClass::Crypto,
                2011,
                CRYPTO.to_vec(),
            ))
    }
}

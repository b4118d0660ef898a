//! Normalized Fresnel integrals S(x) and C(x).
//!
//! S(x) = ∫₀ˣ sin(πt²/2) dt and C(x) = ∫₀ˣ cos(πt²/2) dt, evaluated with the
//! Cephes rational-approximation scheme: a power series in x⁴ below
//! x² = 2.5625 and asymptotic rational forms in 1/(πx²)² above it. Both
//! integrals are odd and tend to 0.5 as x → ∞.

#![allow(clippy::excessive_precision)]

/// Numerator of the S(x) power series (descending powers of x⁴).
const SN: [f64; 6] = [
    -2.99181919401019853726E3,
    7.08840045257738576863E5,
    -6.29741486205862506537E7,
    2.54890880573376359104E9,
    -4.42979518059697779103E10,
    3.18016297876567817986E11,
];

/// Denominator of the S(x) power series (implicit leading 1.0).
const SD: [f64; 6] = [
    2.81376268889994315696E2,
    4.55847810806532581675E4,
    5.17343888770096400730E6,
    4.19320245898111231129E8,
    2.24411795645340920940E10,
    6.07366389490084639049E11,
];

/// Numerator of the C(x) power series.
const CN: [f64; 6] = [
    -4.98843114573573548651E-8,
    9.50428062829859605134E-6,
    -6.45191435683965050962E-4,
    1.88843319396703850064E-2,
    -2.05525900955013891793E-1,
    9.99999999999999998822E-1,
];

/// Denominator of the C(x) power series.
const CD: [f64; 7] = [
    3.99982968972495980367E-12,
    9.15439215774657478799E-10,
    1.25001862479598821474E-7,
    1.22262789024179030997E-5,
    8.68029542941784300606E-4,
    4.12142090722199792936E-2,
    1.00000000000000000118E0,
];

/// Numerator of the asymptotic auxiliary function f(u).
const FN: [f64; 10] = [
    4.21543555043677546506E-1,
    1.43407919780758885261E-1,
    1.15220955073585758835E-2,
    3.45017939782574027900E-4,
    4.63613749287867322088E-6,
    3.05568983790257605827E-8,
    1.02304514164907233465E-10,
    1.72010743268161828879E-13,
    1.34283276233062758925E-16,
    3.76329711269987889006E-20,
];

/// Denominator of f(u) (implicit leading 1.0).
const FD: [f64; 10] = [
    7.51586398353378947175E-1,
    1.16888925859191382142E-1,
    6.44051526508858611005E-3,
    1.55934409164153020873E-4,
    1.84627567348930545870E-6,
    1.12699224763999035261E-8,
    3.60140029589371370404E-11,
    5.88754533621578410010E-14,
    4.52001434074129701496E-17,
    1.25443237090011264384E-20,
];

/// Numerator of the asymptotic auxiliary function g(u).
const GN: [f64; 11] = [
    5.04442073643383265887E-1,
    1.97102833525523411709E-1,
    1.87648584092575249293E-2,
    6.84079380915393090172E-4,
    1.15138826111884280931E-5,
    9.82852443688422223854E-8,
    4.45344415861750144738E-10,
    1.08268041139020870318E-12,
    1.37555460633261799868E-15,
    8.36354435630677421531E-19,
    1.86958710162783235106E-22,
];

/// Denominator of g(u) (implicit leading 1.0).
const GD: [f64; 11] = [
    1.47495759925128324529E0,
    3.37748989120019970451E-1,
    2.53603741420338795122E-2,
    8.14679107184306179049E-4,
    1.27545075667729118702E-5,
    1.04314589657571990585E-7,
    4.60680728146520428211E-10,
    1.10273215066240270757E-12,
    1.38796531259578871258E-15,
    8.39158816283118707363E-19,
    1.86958710162783236342E-22,
];

/// Above this argument both integrals are 0.5 to double precision.
const ASYMPTOTIC_LIMIT: f64 = 36974.0;

/// Evaluate a polynomial in descending coefficient order (Horner).
fn polevl(x: f64, coef: &[f64]) -> f64 {
    coef.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// Evaluate a polynomial with an implicit leading coefficient of 1.0.
fn p1evl(x: f64, coef: &[f64]) -> f64 {
    coef.iter().fold(1.0, |acc, &c| acc * x + c)
}

/// Normalized Fresnel integrals (S(x), C(x)).
///
/// Accurate to at least 14 significant digits for |x| ≤ 1e5, except that
/// arguments beyond 36974 return exactly 0.5 (absolute error below 1e-5,
/// the amplitude of the remaining oscillation). Non-finite input yields NaN.
pub fn fresnel(x: f64) -> (f64, f64) {
    if !x.is_finite() {
        return (f64::NAN, f64::NAN);
    }

    let xa = x.abs();
    let x2 = xa * xa;

    let (mut ss, mut cc);
    if x2 < 2.5625 {
        let t = x2 * x2;
        ss = xa * x2 * polevl(t, &SN) / p1evl(t, &SD);
        cc = xa * polevl(t, &CN) / polevl(t, &CD);
    } else if xa > ASYMPTOTIC_LIMIT {
        ss = 0.5;
        cc = 0.5;
    } else {
        let t = std::f64::consts::PI * x2;
        let u = 1.0 / (t * t);
        let f = 1.0 - u * polevl(u, &FN) / p1evl(u, &FD);
        let g = (1.0 / t) * polevl(u, &GN) / p1evl(u, &GD);

        let half_pi_x2 = std::f64::consts::FRAC_PI_2 * x2;
        let c = half_pi_x2.cos();
        let s = half_pi_x2.sin();
        let pix = std::f64::consts::PI * xa;
        cc = 0.5 + (f * s - g * c) / pix;
        ss = 0.5 - (f * c + g * s) / pix;
    }

    if x < 0.0 {
        ss = -ss;
        cc = -cc;
    }
    (ss, cc)
}

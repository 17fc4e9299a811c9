use derive_more::{Display, Into};

/// Weight of an unloaded standard barbell.
pub const EMPTY_BAR: f64 = 45.0;

/// Default rounding increment (plate pair).
pub const DEFAULT_INCREMENT: f64 = 5.0;

/// Rounding increment for isolation and dumbbell work.
pub const ISOLATION_INCREMENT: f64 = 2.5;

const KG_PER_LB: f64 = 0.453_592;

// Below this baseline, warm-up percentages would land under the empty bar.
const FLOOR_BASELINE: f64 = 125.0;
const FLOOR_FRACTION: f64 = 0.35;

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f64);

impl Weight {
    pub const ZERO: Weight = Weight(0.0);

    pub fn new(value: f64) -> Result<Self, WeightError> {
        if !value.is_finite() || !(0.0..10000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        Ok(Self(value))
    }

    pub(crate) fn raw(value: f64) -> Self {
        Self(value)
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f64>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0 to 9999.9")]
    OutOfRange,
    #[error("Weight must be a decimal")]
    ParseError,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    #[display("lb")]
    Lb,
    #[display("kg")]
    Kg,
}

/// Rounds to the nearest multiple of `increment`, halves away from zero
/// (MROUND semantics: 208.25 at increment 5 gives 210).
#[must_use]
pub fn round_to_increment(value: f64, increment: f64) -> f64 {
    if increment <= 0.0 {
        return value;
    }
    (value / increment).round() * increment
}

/// Gym-usable weight for a fraction of the strength baseline.
///
/// Warm-up percentages of a light baseline fall below the empty bar; in that
/// case the empty bar itself is returned. Non-positive inputs yield zero
/// rather than an error.
#[must_use]
pub fn weight_for_percentage(baseline: Weight, fraction: f64, increment: f64) -> Weight {
    let baseline = f64::from(baseline);

    if baseline <= 0.0 || fraction <= 0.0 {
        return Weight::ZERO;
    }

    if baseline < FLOOR_BASELINE && fraction <= FLOOR_FRACTION {
        return Weight::raw(EMPTY_BAR);
    }

    let rounded = round_to_increment(baseline * fraction, increment);
    // Rounding a near-limit baseline up can land outside the weight range;
    // step back one increment so the result stays representable.
    Weight::new(rounded).unwrap_or_else(|_| Weight::raw(rounded - increment))
}

/// Suggested weight for an accessory exercise as a ratio of the primary
/// lift's max. Unrounded; accessory work has no equipment minimum and the
/// caller picks the increment.
#[must_use]
pub fn accessory_weight(primary_max: Weight, ratio: f64) -> f64 {
    if ratio <= 0.0 {
        return 0.0;
    }
    f64::from(primary_max) * ratio
}

#[must_use]
pub fn convert_units(weight: Weight, from: Unit, to: Unit) -> Weight {
    let value = f64::from(weight);
    match (from, to) {
        (Unit::Lb, Unit::Kg) => Weight::raw(value * KG_PER_LB),
        (Unit::Kg, Unit::Lb) => Weight::raw(value / KG_PER_LB),
        (Unit::Lb, Unit::Lb) | (Unit::Kg, Unit::Kg) => weight,
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, Ok(Weight(0.0)))]
    #[case(225.0, Ok(Weight(225.0)))]
    #[case(9999.9, Ok(Weight(9999.9)))]
    #[case(10000.0, Err(WeightError::OutOfRange))]
    #[case(-5.0, Err(WeightError::OutOfRange))]
    #[case(f64::NAN, Err(WeightError::OutOfRange))]
    fn test_weight_new(#[case] input: f64, #[case] expected: Result<Weight, WeightError>) {
        assert_eq!(Weight::new(input), expected);
    }

    #[rstest]
    #[case("225", Ok(Weight(225.0)))]
    #[case("42.5", Ok(Weight(42.5)))]
    #[case("10000", Err(WeightError::OutOfRange))]
    #[case("", Err(WeightError::ParseError))]
    #[case("abc", Err(WeightError::ParseError))]
    fn test_weight_from_str(#[case] input: &str, #[case] expected: Result<Weight, WeightError>) {
        assert_eq!(Weight::try_from(input), expected);
    }

    #[rstest]
    #[case(208.25, 5.0, 210.0)]
    #[case(18.75, 2.5, 20.0)]
    #[case(207.4, 5.0, 205.0)]
    #[case(212.5, 5.0, 215.0)]
    #[case(100.0, 5.0, 100.0)]
    #[case(100.0, 0.0, 100.0)]
    fn test_round_to_increment(#[case] value: f64, #[case] increment: f64, #[case] expected: f64) {
        assert_approx_eq!(round_to_increment(value, increment), expected);
    }

    #[rstest]
    #[case(225.0, 0.35, 5.0, 80.0)]
    #[case(225.0, 0.80, 5.0, 180.0)]
    #[case(225.0, 0.90, 5.0, 205.0)]
    #[case(225.0, 1.00, 5.0, 225.0)]
    #[case(100.0, 0.35, 5.0, EMPTY_BAR)]
    #[case(120.0, 0.35, 5.0, EMPTY_BAR)]
    #[case(200.0, 0.35, 5.0, 70.0)]
    #[case(125.0, 0.35, 5.0, 45.0)]
    #[case(100.0, 0.80, 5.0, 80.0)]
    #[case(85.0, 0.90, 2.5, 77.5)]
    #[case(225.0, 0.0, 5.0, 0.0)]
    #[case(225.0, -0.5, 5.0, 0.0)]
    #[case(0.0, 0.80, 5.0, 0.0)]
    #[case::near_limit_rounds_down(9999.0, 1.00, 5.0, 9995.0)]
    fn test_weight_for_percentage(
        #[case] baseline: f64,
        #[case] fraction: f64,
        #[case] increment: f64,
        #[case] expected: f64,
    ) {
        assert_approx_eq!(
            f64::from(weight_for_percentage(
                Weight::new(baseline).unwrap(),
                fraction,
                increment
            )),
            expected
        );
    }

    #[rstest]
    #[case(200.0, 0.5, 100.0)]
    #[case(225.0, 0.3, 67.5)]
    #[case(225.0, 0.0, 0.0)]
    #[case(225.0, -1.0, 0.0)]
    fn test_accessory_weight(#[case] primary_max: f64, #[case] ratio: f64, #[case] expected: f64) {
        assert_approx_eq!(
            accessory_weight(Weight::new(primary_max).unwrap(), ratio),
            expected
        );
    }

    #[rstest]
    #[case(100.0, Unit::Lb, Unit::Kg, 45.3592)]
    #[case(45.3592, Unit::Kg, Unit::Lb, 100.0)]
    #[case(100.0, Unit::Lb, Unit::Lb, 100.0)]
    #[case(100.0, Unit::Kg, Unit::Kg, 100.0)]
    fn test_convert_units(
        #[case] weight: f64,
        #[case] from: Unit,
        #[case] to: Unit,
        #[case] expected: f64,
    ) {
        assert_approx_eq!(
            f64::from(convert_units(Weight::new(weight).unwrap(), from, to)),
            expected
        );
    }

    #[rstest]
    #[case(225.0)]
    #[case(42.5)]
    #[case(0.0)]
    fn test_convert_units_round_trip(#[case] weight: f64) {
        let weight = Weight::new(weight).unwrap();
        let there = convert_units(weight, Unit::Lb, Unit::Kg);
        let back = convert_units(there, Unit::Kg, Unit::Lb);
        assert_approx_eq!(f64::from(back), f64::from(weight), 1e-9);
    }

    #[rstest]
    #[case(137.5, 0.62, 5.0)]
    #[case(300.0, 0.87, 5.0)]
    #[case(95.0, 0.73, 2.5)]
    fn test_weight_for_percentage_multiple_of_increment(
        #[case] baseline: f64,
        #[case] fraction: f64,
        #[case] increment: f64,
    ) {
        let weight = f64::from(weight_for_percentage(
            Weight::new(baseline).unwrap(),
            fraction,
            increment,
        ));
        assert_approx_eq!(weight % increment, 0.0);
    }
}

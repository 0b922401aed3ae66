//! Activation functions.
//!
//! Every layer computes a pre-activation `z = a_prev * W` and then applies a pointwise
//! activation `a = f(z)`. All functions here are parameterized by a `gain` and a
//! `center`: `f(x; gain, center)`.
//!
//! The engine does not hold an [`Activation`] directly. It holds a [`Nonlinearity`],
//! which is either a built-in activation bound to a gain/center pair or an arbitrary
//! pointwise function with its derivative.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{Error, Result};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Built-in pointwise activation.
pub enum Activation {
    Sigmoid,
    HyperbolicTangent,
    /// Exponential linear unit.
    Elu,
    /// Rectified linear unit. The only variant flagged non-linear, which makes the
    /// output layer pass its pre-activation through unchanged.
    #[cfg_attr(feature = "serde", serde(rename = "relu"))]
    ReLU,
    /// ReLU forward, sigmoid derivative backward. Avoids dead units.
    #[cfg_attr(feature = "serde", serde(rename = "relu_sigmoid"))]
    ReLUSigmoid,
    Gaussian,
    Sine,
    ArcTangent,
}

impl Activation {
    pub const ALL: [Activation; 8] = [
        Activation::Sigmoid,
        Activation::HyperbolicTangent,
        Activation::Elu,
        Activation::ReLU,
        Activation::ReLUSigmoid,
        Activation::Gaussian,
        Activation::Sine,
        Activation::ArcTangent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::HyperbolicTangent => "tanh",
            Activation::Elu => "elu",
            Activation::ReLU => "relu",
            Activation::ReLUSigmoid => "relu-sigmoid",
            Activation::Gaussian => "gaussian",
            Activation::Sine => "sine",
            Activation::ArcTangent => "atan",
        }
    }

    #[inline]
    pub fn activate(self, x: f64, gain: f64, center: f64) -> f64 {
        let xc = x - center;
        match self {
            Activation::Sigmoid => sigmoid(xc, gain),
            Activation::HyperbolicTangent => tanh(xc),
            Activation::Elu => {
                if xc >= 0.0 {
                    xc
                } else {
                    gain * (xc.exp() - 1.0)
                }
            }
            Activation::ReLU | Activation::ReLUSigmoid => (xc * gain).max(0.0),
            Activation::Gaussian => (-gain * (xc * xc)).exp(),
            Activation::Sine => gain * xc.sin(),
            Activation::ArcTangent => gain * (gain * xc).atan(),
        }
    }

    #[inline]
    pub fn derivative(self, x: f64, gain: f64, center: f64) -> f64 {
        let xc = x - center;
        match self {
            Activation::Sigmoid | Activation::ReLUSigmoid => {
                if gain == 1.0 {
                    let fx = sigmoid(xc, gain);
                    fx * (1.0 - fx)
                } else {
                    sigmoid_derivative(xc, gain)
                }
            }
            Activation::HyperbolicTangent => {
                if gain == 1.0 {
                    let fx = tanh(xc);
                    1.0 - fx * fx
                } else {
                    tanh_derivative(xc, gain)
                }
            }
            Activation::Elu => {
                if gain < 0.0 {
                    0.0
                } else if xc >= 0.0 {
                    1.0
                } else {
                    gain + self.activate(x, gain, center)
                }
            }
            Activation::ReLU => {
                if x >= center {
                    gain
                } else {
                    0.0
                }
            }
            // Uses gain^2 in the exponent while the activation uses gain.
            Activation::Gaussian => {
                let g2 = gain * gain;
                -2.0 * g2 * xc * (-g2 * xc * xc).exp()
            }
            Activation::Sine => gain * xc.cos(),
            Activation::ArcTangent => gain / (1.0 + gain * gain * xc * xc),
        }
    }

    /// True when the output layer must bypass the activation.
    #[inline]
    pub fn is_non_linear(self) -> bool {
        matches!(self, Activation::ReLU)
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" | "hyperbolic-tangent" => Ok(Activation::HyperbolicTangent),
            "elu" => Ok(Activation::Elu),
            "relu" => Ok(Activation::ReLU),
            "relu-sigmoid" | "relusigmoid" => Ok(Activation::ReLUSigmoid),
            "gaussian" => Ok(Activation::Gaussian),
            "sine" | "sin" => Ok(Activation::Sine),
            "atan" | "arctangent" => Ok(Activation::ArcTangent),
            other => Err(Error::InvalidArgument(format!(
                "unknown activation '{other}'"
            ))),
        }
    }
}

#[inline]
fn sigmoid(xc: f64, gain: f64) -> f64 {
    1.0 / (1.0 + (-gain * xc).exp())
}

#[inline]
fn sigmoid_derivative(xc: f64, gain: f64) -> f64 {
    let e = (-gain * xc).exp();
    let e1 = 1.0 + e;
    gain * e / (e1 * e1)
}

/// `2 / (1 + exp(-2x)) - 1`; the gain is not applied to the forward pass.
#[inline]
fn tanh(xc: f64) -> f64 {
    2.0 / (1.0 + (-2.0 * xc).exp()) - 1.0
}

#[inline]
fn tanh_derivative(xc: f64, gain: f64) -> f64 {
    let e = (-2.0 * (gain * xc)).exp();
    let e1 = 1.0 + e;
    4.0 * gain * e / (e1 * e1)
}

pub type PointwiseFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// The pointwise function an `Mlp` applies at every layer, with its derivative.
#[derive(Clone)]
pub enum Nonlinearity {
    Builtin {
        activation: Activation,
        gain: f64,
        center: f64,
    },
    Custom {
        activate: PointwiseFn,
        derivative: PointwiseFn,
        non_linear: bool,
    },
}

impl Nonlinearity {
    /// Bind a built-in activation to a gain and center.
    pub fn new(activation: Activation, gain: f64, center: f64) -> Self {
        Nonlinearity::Builtin {
            activation,
            gain,
            center,
        }
    }

    /// An arbitrary pointwise mapping and its derivative.
    ///
    /// `non_linear` selects the output-layer passthrough, as for [`Activation::ReLU`].
    pub fn custom<F, D>(activate: F, derivative: D, non_linear: bool) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
        D: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Nonlinearity::Custom {
            activate: Arc::new(activate),
            derivative: Arc::new(derivative),
            non_linear,
        }
    }

    /// Validate the gain/center of a built-in activation.
    pub fn validate(&self) -> Result<()> {
        if let Nonlinearity::Builtin { gain, center, .. } = self {
            if !(gain.is_finite() && center.is_finite()) {
                return Err(Error::InvalidConfig(format!(
                    "activation gain and center must be finite, got gain={gain} center={center}"
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn activate(&self, x: f64) -> f64 {
        match self {
            Nonlinearity::Builtin {
                activation,
                gain,
                center,
            } => activation.activate(x, *gain, *center),
            Nonlinearity::Custom { activate, .. } => activate(x),
        }
    }

    #[inline]
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            Nonlinearity::Builtin {
                activation,
                gain,
                center,
            } => activation.derivative(x, *gain, *center),
            Nonlinearity::Custom { derivative, .. } => derivative(x),
        }
    }

    #[inline]
    pub fn is_non_linear(&self) -> bool {
        match self {
            Nonlinearity::Builtin { activation, .. } => activation.is_non_linear(),
            Nonlinearity::Custom { non_linear, .. } => *non_linear,
        }
    }
}

impl Default for Nonlinearity {
    fn default() -> Self {
        Nonlinearity::from(Activation::Sigmoid)
    }
}

/// Gain 1, center 0.
impl From<Activation> for Nonlinearity {
    fn from(activation: Activation) -> Self {
        Nonlinearity::new(activation, 1.0, 0.0)
    }
}

impl fmt::Debug for Nonlinearity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nonlinearity::Builtin {
                activation,
                gain,
                center,
            } => f
                .debug_struct("Builtin")
                .field("activation", activation)
                .field("gain", gain)
                .field("center", center)
                .finish(),
            Nonlinearity::Custom { non_linear, .. } => f
                .debug_struct("Custom")
                .field("non_linear", non_linear)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_derivative(act: Activation, x: f64, gain: f64, center: f64) -> f64 {
        let eps = 1e-6;
        (act.activate(x + eps, gain, center) - act.activate(x - eps, gain, center)) / (2.0 * eps)
    }

    #[test]
    fn sigmoid_fast_path_matches_general_formula() {
        for x in [-3.0, -0.5, 0.0, 0.25, 2.0] {
            let fast = Activation::Sigmoid.derivative(x, 1.0, 0.0);
            let general = sigmoid_derivative(x, 1.0);
            assert!((fast - general).abs() < 1e-12, "x={x} fast={fast} general={general}");
        }
    }

    #[test]
    fn tanh_fast_path_matches_general_formula() {
        for x in [-3.0, -0.5, 0.0, 0.25, 2.0] {
            let fast = Activation::HyperbolicTangent.derivative(x, 1.0, 0.0);
            let general = tanh_derivative(x, 1.0);
            assert!((fast - general).abs() < 1e-12, "x={x} fast={fast} general={general}");
        }
    }

    #[test]
    fn derivatives_match_finite_differences_at_unit_gain() {
        let smooth = [
            Activation::Sigmoid,
            Activation::HyperbolicTangent,
            Activation::Elu,
            Activation::ReLU,
            Activation::Gaussian,
            Activation::Sine,
            Activation::ArcTangent,
        ];
        for act in smooth {
            for x in [-1.3, -0.4, 0.35, 1.7] {
                let analytic = act.derivative(x, 1.0, 0.0);
                let numeric = numeric_derivative(act, x, 1.0, 0.0);
                assert!(
                    (analytic - numeric).abs() < 1e-5,
                    "{act}: x={x} analytic={analytic} numeric={numeric}"
                );
            }
        }
    }

    #[test]
    fn sigmoid_general_derivative_respects_gain_and_center() {
        let (gain, center) = (2.5, 0.3);
        for x in [-1.0, 0.3, 0.9] {
            let analytic = Activation::Sigmoid.derivative(x, gain, center);
            let numeric = numeric_derivative(Activation::Sigmoid, x, gain, center);
            assert!((analytic - numeric).abs() < 1e-5);
        }
    }

    #[test]
    fn tanh_ignores_gain_in_forward_pass() {
        let a = Activation::HyperbolicTangent.activate(0.7, 1.0, 0.0);
        let b = Activation::HyperbolicTangent.activate(0.7, 3.0, 0.0);
        assert_eq!(a, b);
        assert!((a - 0.7_f64.tanh()).abs() < 1e-12);
    }

    #[test]
    fn gaussian_derivative_uses_squared_gain() {
        // Pinned closed form: -2 g^2 x exp(-g^2 x^2), which is not d/dx exp(-g x^2) for g != 1.
        let (x, gain) = (0.5, 2.0);
        let expected = -4.0 * (-1.0_f64).exp();
        let got = Activation::Gaussian.derivative(x, gain, 0.0);
        assert!((got - expected).abs() < 1e-12);

        let naive = numeric_derivative(Activation::Gaussian, x, gain, 0.0);
        assert!((got - naive).abs() > 1e-3);
    }

    #[test]
    fn elu_branches() {
        assert!((Activation::Elu.activate(1.4, 0.1, 0.4) - 1.0).abs() < 1e-12);
        let below = Activation::Elu.activate(-0.6, 0.1, 0.4);
        assert!((below - 0.1 * ((-1.0_f64).exp() - 1.0)).abs() < 1e-12);
        assert_eq!(Activation::Elu.derivative(2.0, 0.1, 0.4), 1.0);
        assert_eq!(Activation::Elu.derivative(-2.0, -0.5, 0.0), 0.0);
    }

    #[test]
    fn relu_variants() {
        assert_eq!(Activation::ReLU.activate(-1.0, 1.0, 0.0), 0.0);
        assert_eq!(Activation::ReLU.activate(2.0, 0.5, 0.0), 1.0);
        assert_eq!(Activation::ReLU.derivative(0.0, 0.5, 0.0), 0.5);
        assert_eq!(Activation::ReLU.derivative(-0.1, 0.5, 0.0), 0.0);

        assert_eq!(
            Activation::ReLUSigmoid.activate(2.0, 1.0, 0.0),
            Activation::ReLU.activate(2.0, 1.0, 0.0)
        );
        assert_eq!(
            Activation::ReLUSigmoid.derivative(0.0, 1.0, 0.0),
            Activation::Sigmoid.derivative(0.0, 1.0, 0.0)
        );
    }

    #[test]
    fn only_relu_is_non_linear() {
        for act in Activation::ALL {
            assert_eq!(act.is_non_linear(), act == Activation::ReLU, "{act}");
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for act in Activation::ALL {
            assert_eq!(act.name().parse::<Activation>().unwrap(), act);
        }
        assert_eq!("TANH".parse::<Activation>().unwrap(), Activation::HyperbolicTangent);
        assert!("softmax".parse::<Activation>().is_err());
    }

    #[test]
    fn custom_nonlinearity_dispatches_to_closures() {
        let leak = 0.01;
        let nl = Nonlinearity::custom(
            move |x| if x > 0.0 { x } else { leak * x },
            move |x| if x > 0.0 { 1.0 } else { leak },
            true,
        );
        assert_eq!(nl.activate(-2.0), -0.02);
        assert_eq!(nl.derivative(3.0), 1.0);
        assert!(nl.is_non_linear());
        assert!(nl.validate().is_ok());

        let builtin = Nonlinearity::new(Activation::Sine, 2.0, 0.0);
        assert!((builtin.activate(0.5) - 2.0 * 0.5_f64.sin()).abs() < 1e-12);
        assert!(!builtin.is_non_linear());
        assert!(Nonlinearity::new(Activation::Sine, f64::NAN, 0.0).validate().is_err());
    }
}

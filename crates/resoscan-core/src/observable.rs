//! Observables whose resolution is tracked across the scan.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named column definition handed to the feature-extraction capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnExpr {
    pub name: String,
    pub expression: String,
}

impl fmt::Display for ColumnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.expression)
    }
}

/// A residual observable: its short key, the column it is read from, and
/// the axis title used for its curves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observable {
    /// Short key used in artifact names (`d0`, `p`, ...).
    pub key: String,
    /// Column holding the residual distribution.
    pub column: String,
    /// Column definition evaluated by the extraction capability.
    pub expression: String,
    /// Axis title for the resolution curve.
    pub axis_title: String,
}

impl Observable {
    #[must_use]
    pub fn new(key: &str, column: &str, expression: &str, axis_title: &str) -> Self {
        Self {
            key: key.to_string(),
            column: column.to_string(),
            expression: expression.to_string(),
            axis_title: axis_title.to_string(),
        }
    }

    #[must_use]
    pub fn column_expr(&self) -> ColumnExpr {
        ColumnExpr {
            name: self.column.clone(),
            expression: self.expression.clone(),
        }
    }
}

/// Track impact parameters and momentum/curvature residuals.
#[must_use]
pub fn default_observables() -> Vec<Observable> {
    vec![
        Observable::new("d0", "RP_TRK_D0_um", "RP_TRK_D0 * 1000.0", "d0 resolution (um)"),
        Observable::new("z0", "RP_TRK_Z0_um", "RP_TRK_Z0 * 1000.0", "z0 resolution (um)"),
        Observable::new(
            "p",
            "muon_res_p",
            "leptonResolution(muons_all, 0)",
            "Momentum resolution (%)",
        ),
        Observable::new(
            "k",
            "muon_res_k",
            "leptonResolution(muons_all, 3)",
            "Curvature resolution (%)",
        ),
    ]
}

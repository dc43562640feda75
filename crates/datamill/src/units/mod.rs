//! Built-in transformation units.

pub mod arith;
pub mod encode;
pub mod missing;
pub mod periodic;
pub mod scale;
pub mod select;
pub mod temporal;

use crate::compose::{Concat, Sequential};
use crate::error::Result;
use crate::registry::Registry;

/// Register every built-in unit under its declared name.
pub fn register_builtins(registry: &mut Registry) -> Result<()> {
    registry.register_default::<Sequential>()?;
    registry.register_default::<Concat>()?;

    registry.register_default::<arith::Add>()?;
    registry.register_default::<arith::Sub>()?;
    registry.register_default::<arith::Mul>()?;
    registry.register_default::<arith::Div>()?;

    registry.register_default::<missing::GapFill>()?;
    registry.register_default::<missing::DropMissingRows>()?;
    registry.register_default::<missing::FillConstant>()?;
    registry.register_default::<missing::FillFromColumn>()?;

    registry.register_default::<scale::StandardScaler>()?;
    registry.register_default::<scale::MinMaxScaler>()?;
    registry.register_default::<scale::RobustScaler>()?;

    registry.register_default::<encode::OneHotEncoder>()?;
    registry.register_default::<encode::LabelEncoder>()?;

    registry.register_default::<temporal::ParseDatetime>()?;
    registry.register_default::<temporal::DayOfYear>()?;
    registry.register_default::<temporal::MonthOfYear>()?;
    registry.register_default::<temporal::DayOfMonth>()?;
    registry.register_default::<temporal::DayOfWeek>()?;
    registry.register_default::<temporal::IsWeekend>()?;

    registry.register_default::<periodic::SinCos>()?;

    registry.register_default::<select::DropColumns>()?;

    Ok(())
}

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::entity::sea_orm_active_enums::ShiftType;

use super::PayrollError;

impl ShiftType {
    pub fn label(self) -> &'static str {
        match self {
            ShiftType::FullDay => "Full Day",
            ShiftType::OneAndAHalfDay => "One-and-a-Half Day",
            ShiftType::HalfDayMorning => "Half Day Morning",
            ShiftType::HalfDayEvening => "Half Day Evening",
        }
    }

    /// Day credit for one entry of this shift.
    ///
    /// Looked up once when the entry is written and stored with it, so changing
    /// this table never rewrites history.
    pub fn multiplier(self) -> Decimal {
        match self {
            ShiftType::FullDay => dec!(1.0),
            ShiftType::OneAndAHalfDay => dec!(1.5),
            ShiftType::HalfDayMorning | ShiftType::HalfDayEvening => dec!(0.5),
        }
    }
}

impl FromStr for ShiftType {
    type Err = PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Full Day" => Ok(ShiftType::FullDay),
            "One-and-a-Half Day" => Ok(ShiftType::OneAndAHalfDay),
            "Half Day Morning" => Ok(ShiftType::HalfDayMorning),
            "Half Day Evening" => Ok(ShiftType::HalfDayEvening),
            other => Err(PayrollError::InvalidShiftType(other.to_owned())),
        }
    }
}

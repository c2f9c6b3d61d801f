//! MysqlTime - 日期时间值及其打包格式
//!
//! DATE / DATETIME / TIMESTAMP 在存储中统一使用 64 位打包整数：
//! `((year*13+month)<<5 | day) << 17 | hour<<12 | minute<<6 | second`，
//! 再左移 24 位并入微秒。允许 MySQL 的零日期 `0000-00-00`。

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::codec::error::{CodecError, CodecResult};

pub const MAX_YEAR: u16 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct MysqlTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub microsecond: u32,
}

impl MysqlTime {
    pub fn date(year: u16, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            ..Default::default()
        }
    }

    pub fn datetime(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond: 0,
        }
    }

    pub fn with_microsecond(mut self, microsecond: u32) -> Self {
        self.microsecond = microsecond;
        self
    }

    pub fn is_zero(&self) -> bool {
        *self == MysqlTime::default()
    }

    /// 第一个超出打包格式范围的字段名
    pub fn invalid_field(&self) -> Option<&'static str> {
        if self.year > MAX_YEAR {
            Some("year")
        } else if self.month > 12 {
            Some("month")
        } else if self.day > 31 {
            Some("day")
        } else if self.hour > 23 {
            Some("hour")
        } else if self.minute > 59 {
            Some("minute")
        } else if self.second > 59 {
            Some("second")
        } else if self.microsecond > 999_999 {
            Some("microsecond")
        } else {
            None
        }
    }

    pub fn to_packed_u64(&self) -> u64 {
        let ymd = ((u64::from(self.year) * 13 + u64::from(self.month)) << 5) | u64::from(self.day);
        let hms = (u64::from(self.hour) << 12) | (u64::from(self.minute) << 6) | u64::from(self.second);
        (((ymd << 17) | hms) << 24) | u64::from(self.microsecond)
    }

    pub fn from_packed_u64(packed: u64) -> CodecResult<Self> {
        if packed == 0 {
            return Ok(MysqlTime::default());
        }
        let microsecond = (packed & ((1 << 24) - 1)) as u32;
        let ymdhms = packed >> 24;
        let ymd = ymdhms >> 17;
        let ym = ymd >> 5;
        let hms = ymdhms & ((1 << 17) - 1);

        let year = ym / 13;
        if year > u64::from(MAX_YEAR) {
            return Err(CodecError::corrupt(format!("packed time {} out of range", packed)));
        }
        let t = Self {
            year: year as u16,
            month: (ym % 13) as u8,
            day: (ymd & 31) as u8,
            hour: (hms >> 12) as u8,
            minute: ((hms >> 6) & 63) as u8,
            second: (hms & 63) as u8,
            microsecond,
        };
        match t.invalid_field() {
            None => Ok(t),
            Some(field) => Err(CodecError::corrupt(format!(
                "packed time {} has {} out of range",
                packed, field
            ))),
        }
    }
}

impl fmt::Display for MysqlTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.microsecond != 0 {
            write!(f, ".{:06}", self.microsecond)?;
        }
        Ok(())
    }
}

impl From<NaiveDateTime> for MysqlTime {
    fn from(dt: NaiveDateTime) -> Self {
        Self {
            year: dt.year().clamp(0, 9999) as u16,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
            microsecond: dt.nanosecond() / 1_000 % 1_000_000,
        }
    }
}

impl TryFrom<MysqlTime> for NaiveDateTime {
    type Error = CodecError;

    fn try_from(t: MysqlTime) -> CodecResult<Self> {
        NaiveDate::from_ymd_opt(i32::from(t.year), u32::from(t.month), u32::from(t.day))
            .and_then(|d| {
                d.and_hms_micro_opt(
                    u32::from(t.hour),
                    u32::from(t.minute),
                    u32::from(t.second),
                    t.microsecond,
                )
            })
            .ok_or_else(|| CodecError::InvalidInput(format!("{} is not a calendar time", t)))
    }
}

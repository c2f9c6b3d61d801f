//! MyDecimal - 定点十进制数及其二进制格式
//!
//! 二进制格式按 `(precision, frac)` 切分数字：整数部分和小数部分各自按 9 位一组
//! 写成大端整数，不足 9 位的组按位数取 1~4 字节。负数的所有字节取反，
//! 最后翻转首字节最高位，使同一 `(precision, frac)` 下的字节序与数值序一致。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::codec::error::{CodecError, CodecResult};

/// 最大精度（总位数）
pub const MAX_PRECISION: usize = 65;
/// 最大小数位数
pub const MAX_SCALE: usize = 30;

const DIGITS_PER_WORD: usize = 9;
const WORD_SIZE: usize = 4;
const DIG_TO_BYTES: [usize; 10] = [0, 1, 1, 2, 2, 3, 3, 4, 4, 4];

/// 解析文本时使用的 decNumber 单元数，每单元 3 位
const PARSE_UNITS: usize = 22;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MyDecimal {
    negative: bool,
    /// 整数部分，无前导零
    int_digits: Vec<u8>,
    /// 小数部分，长度即小数位数
    frac_digits: Vec<u8>,
}

impl MyDecimal {
    fn from_digits(negative: bool, mut int_digits: Vec<u8>, frac_digits: Vec<u8>) -> CodecResult<Self> {
        let leading = int_digits.iter().take_while(|d| **d == 0).count();
        int_digits.drain(..leading);
        if int_digits.len() + frac_digits.len() > MAX_PRECISION || frac_digits.len() > MAX_SCALE {
            return Err(CodecError::InvalidInput(format!(
                "decimal with {} integer and {} fraction digits is out of range",
                int_digits.len(),
                frac_digits.len()
            )));
        }
        let is_zero = int_digits.is_empty() && frac_digits.iter().all(|d| *d == 0);
        Ok(Self {
            negative: negative && !is_zero,
            int_digits,
            frac_digits,
        })
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// 恰好容纳该值的 `(precision, frac)`，精度至少为 1
    pub fn precision_and_frac(&self) -> (usize, usize) {
        let frac = self.frac_digits.len();
        ((self.int_digits.len() + frac).max(1), frac)
    }

    /// 按 `(precision, frac)` 计算二进制长度
    pub fn bin_size(precision: usize, frac: usize) -> usize {
        let digits_int = precision - frac;
        (digits_int / DIGITS_PER_WORD) * WORD_SIZE
            + DIG_TO_BYTES[digits_int % DIGITS_PER_WORD]
            + (frac / DIGITS_PER_WORD) * WORD_SIZE
            + DIG_TO_BYTES[frac % DIGITS_PER_WORD]
    }

    /// 写入二进制格式；整数位超出 `precision - frac` 或小数位超出 `frac` 时报错
    pub fn write_bin(&self, precision: usize, frac: usize, buf: &mut Vec<u8>) -> CodecResult<()> {
        check_precision(precision, frac).map_err(CodecError::InvalidInput)?;
        let digits_int = precision - frac;
        if self.int_digits.len() > digits_int || self.frac_digits.len() > frac {
            return Err(CodecError::TypeMismatch(format!(
                "decimal {} does not fit DECIMAL({},{})",
                self, precision, frac
            )));
        }

        let mut int_part = vec![0u8; digits_int - self.int_digits.len()];
        int_part.extend_from_slice(&self.int_digits);
        let mut frac_part = self.frac_digits.clone();
        frac_part.resize(frac, 0);

        let start = buf.len();
        let leading = digits_int % DIGITS_PER_WORD;
        let (head, words) = int_part.split_at(leading);
        put_group(buf, head);
        for word in words.chunks(DIGITS_PER_WORD) {
            put_group(buf, word);
        }
        for group in frac_part.chunks(DIGITS_PER_WORD) {
            put_group(buf, group);
        }

        if self.negative {
            for b in &mut buf[start..] {
                *b = !*b;
            }
        }
        buf[start] ^= 0x80;
        Ok(())
    }

    /// 读取二进制格式，返回值和消耗的字节数
    pub fn read_bin(data: &[u8], precision: usize, frac: usize) -> CodecResult<(Self, usize)> {
        check_precision(precision, frac).map_err(CodecError::corrupt)?;
        let size = Self::bin_size(precision, frac);
        if data.len() < size {
            return Err(CodecError::corrupt(format!(
                "decimal needs {} bytes, only {} left",
                size,
                data.len()
            )));
        }
        let mut bin = data[..size].to_vec();
        let negative = bin[0] & 0x80 == 0;
        bin[0] ^= 0x80;
        if negative {
            for b in &mut bin {
                *b = !*b;
            }
        }

        let digits_int = precision - frac;
        let mut pos = 0;
        let mut int_digits = Vec::with_capacity(digits_int);
        let leading = digits_int % DIGITS_PER_WORD;
        take_group(&bin, &mut pos, leading, &mut int_digits)?;
        for _ in 0..digits_int / DIGITS_PER_WORD {
            take_group(&bin, &mut pos, DIGITS_PER_WORD, &mut int_digits)?;
        }
        let mut frac_digits = Vec::with_capacity(frac);
        for _ in 0..frac / DIGITS_PER_WORD {
            take_group(&bin, &mut pos, DIGITS_PER_WORD, &mut frac_digits)?;
        }
        take_group(&bin, &mut pos, frac % DIGITS_PER_WORD, &mut frac_digits)?;

        let value = Self::from_digits(negative, int_digits, frac_digits)
            .map_err(|e| CodecError::corrupt(e.to_string()))?;
        Ok((value, size))
    }
}

fn check_precision(precision: usize, frac: usize) -> Result<(), String> {
    if precision == 0 || precision > MAX_PRECISION || frac > MAX_SCALE || frac > precision {
        return Err(format!("invalid decimal precision {} and frac {}", precision, frac));
    }
    Ok(())
}

/// 一组（至多 9 位）数字写成对应宽度的大端整数
fn put_group(buf: &mut Vec<u8>, digits: &[u8]) {
    if digits.is_empty() {
        return;
    }
    let value = digits.iter().fold(0u32, |acc, d| acc * 10 + u32::from(*d));
    let width = DIG_TO_BYTES[digits.len()];
    buf.extend_from_slice(&value.to_be_bytes()[WORD_SIZE - width..]);
}

fn take_group(bin: &[u8], pos: &mut usize, digits: usize, out: &mut Vec<u8>) -> CodecResult<()> {
    if digits == 0 {
        return Ok(());
    }
    let width = DIG_TO_BYTES[digits];
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - width..].copy_from_slice(&bin[*pos..*pos + width]);
    *pos += width;

    let value = u32::from_be_bytes(word);
    if value >= 10u32.pow(digits as u32) {
        return Err(CodecError::corrupt(format!(
            "decimal word {} has more than {} digits",
            value, digits
        )));
    }
    let text = format!("{:0width$}", value, width = digits);
    out.extend(text.bytes().map(|b| b - b'0'));
    Ok(())
}

impl FromStr for MyDecimal {
    type Err = CodecError;

    fn from_str(s: &str) -> CodecResult<Self> {
        let parsed: dec::Decimal<PARSE_UNITS> = s
            .trim()
            .parse()
            .map_err(|e| CodecError::InvalidInput(format!("invalid decimal {:?}: {}", s, e)))?;
        if !parsed.is_finite() {
            return Err(CodecError::InvalidInput(format!("decimal {:?} is not finite", s)));
        }

        let coefficient = parsed.coefficient_digits();
        let exponent = parsed.exponent();
        if exponent >= 0 {
            let exponent = exponent as usize;
            if exponent > MAX_PRECISION {
                return Err(CodecError::InvalidInput(format!("decimal {:?} is out of range", s)));
            }
            let mut int_digits = coefficient;
            int_digits.resize(int_digits.len() + exponent, 0);
            return Self::from_digits(parsed.is_negative(), int_digits, Vec::new());
        }

        let scale = exponent.unsigned_abs() as usize;
        let (int_digits, frac_digits) = if coefficient.len() > scale {
            let (i, f) = coefficient.split_at(coefficient.len() - scale);
            (i.to_vec(), f.to_vec())
        } else {
            let mut frac = vec![0u8; scale - coefficient.len()];
            frac.extend_from_slice(&coefficient);
            (Vec::new(), frac)
        };
        Self::from_digits(parsed.is_negative(), int_digits, frac_digits)
    }
}

impl TryFrom<String> for MyDecimal {
    type Error = CodecError;

    fn try_from(s: String) -> CodecResult<Self> {
        s.parse()
    }
}

impl From<MyDecimal> for String {
    fn from(d: MyDecimal) -> Self {
        d.to_string()
    }
}

impl From<i64> for MyDecimal {
    fn from(v: i64) -> Self {
        let mut d = MyDecimal::from(v.unsigned_abs());
        d.negative = v < 0;
        d
    }
}

impl From<u64> for MyDecimal {
    fn from(v: u64) -> Self {
        let int_digits = if v == 0 {
            Vec::new()
        } else {
            v.to_string().bytes().map(|b| b - b'0').collect()
        };
        Self {
            negative: false,
            int_digits,
            frac_digits: Vec::new(),
        }
    }
}

impl fmt::Display for MyDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        if self.int_digits.is_empty() {
            write!(f, "0")?;
        }
        for d in &self.int_digits {
            write!(f, "{}", d)?;
        }
        if !self.frac_digits.is_empty() {
            write!(f, ".")?;
            for d in &self.frac_digits {
                write!(f, "{}", d)?;
            }
        }
        Ok(())
    }
}

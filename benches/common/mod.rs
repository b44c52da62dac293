//! Shared bench value type: a representative slot spin result.

use spinpool::{Decoder, Encoder, Error, FieldKey, ObjectDecode, ObjectEncode, Poolable, Result};

#[derive(Default)]
pub struct SpinResult {
    pub bet: u64,
    pub win: u64,
    pub multiplier: f64,
    pub reels: Vec<u8>,
    pub bonus: bool,
}

impl SpinResult {
    pub fn fill(&mut self) {
        self.bet = 100;
        self.win = 2_500;
        self.multiplier = 2.5;
        self.reels.extend_from_slice(&[7, 7, 7, 3, 11]);
        self.bonus = true;
    }
}

impl ObjectEncode for SpinResult {
    fn is_empty(&self) -> bool {
        self.bet == 0 && self.win == 0 && self.reels.is_empty()
    }

    fn encode_fields(&self, enc: &mut Encoder) {
        enc.u64_field_opt("bet", self.bet);
        enc.u64_field_opt("win", self.win);
        enc.f64_field_opt("multiplier", self.multiplier);
        if !self.reels.is_empty() {
            enc.key("reels");
            enc.start_array();
            for &r in &self.reels {
                enc.u64(u64::from(r));
            }
            enc.end_array();
        }
        enc.bool_field_opt("bonus", self.bonus);
    }
}

impl ObjectDecode for SpinResult {
    fn decode_field(&mut self, dec: &mut Decoder<'_>, key: FieldKey<'_>) -> Result<()> {
        match key.as_bytes() {
            b"bet" => self.bet = dec.u64()?,
            b"win" => self.win = dec.u64()?,
            b"multiplier" => self.multiplier = dec.f64()?,
            b"reels" => {
                let reels = &mut self.reels;
                dec.array(|d| {
                    reels.push(d.u8()?);
                    Ok(())
                })?;
            }
            b"bonus" => self.bonus = dec.bool()?,
            _ => return Err(Error::UnknownField(key.to_string())),
        }
        Ok(())
    }
}

impl Poolable for SpinResult {
    fn reset(&mut self) {
        self.bet = 0;
        self.win = 0;
        self.multiplier = 0.0;
        self.reels.clear();
        self.bonus = false;
    }
}

use aes::Aes128;
use cmac::crypto_mac::{InvalidKeyLength, Output};
use cmac::{Cmac, Mac, NewMac};

const ZERO: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];

pub fn s1(input: &[u8]) -> Result<Output<Cmac<Aes128>>, InvalidKeyLength> {
    aes_cmac(&ZERO, input)
}

pub fn aes_cmac(key: &[u8], input: &[u8]) -> Result<Output<Cmac<Aes128>>, InvalidKeyLength> {
    let mut mac = Cmac::<Aes128>::new_from_slice(key)?;
    mac.update(input);
    Ok(mac.finalize())
}

/// Application key identifier derivation, 6 bits.
pub fn k4(n: &[u8]) -> Result<u8, InvalidKeyLength> {
    let salt = s1(b"smk4")?;
    let t = aes_cmac(&salt.into_bytes(), n)?;
    let t = t.into_bytes();
    let result = aes_cmac(&t, &[b'i', b'd', b'6', 0x01])?.into_bytes();
    Ok(result[15] & 0b00111111)
}

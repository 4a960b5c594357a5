//! Minimal ABI word codec for the handful of exchange and TRC-20 calls the
//! liquidity flow needs. Parameters and results are hex strings of 32-byte
//! words, which is what the full node's trigger endpoints exchange.

use cosmwasm_std::Uint256;

use crate::address::TronAddress;
use crate::error::Error;

/// Size of one ABI word in bytes
pub const WORD_LEN: usize = 32;

/// Encode a uint256 argument
pub fn encode_uint(value: Uint256) -> String {
    hex::encode(value.to_be_bytes())
}

/// Encode an address argument (the 20-byte account id, left padded)
pub fn encode_address(address: &TronAddress) -> String {
    let mut word = [0u8; WORD_LEN];
    word[12..].copy_from_slice(&address.account_id());
    hex::encode(word)
}

/// Concatenate encoded words into a call parameter string
pub fn encode_params(words: &[String]) -> String {
    words.concat()
}

fn decode_words(data: &str) -> Result<Vec<[u8; WORD_LEN]>, Error> {
    let bytes = hex::decode(data.trim_start_matches("0x"))
        .map_err(|e| Error::Contract(format!("invalid hex in call result: {}", e)))?;
    if bytes.len() % WORD_LEN != 0 {
        return Err(Error::Contract(format!(
            "call result of {} bytes is not word aligned",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(WORD_LEN)
        .map(|chunk| {
            let mut word = [0u8; WORD_LEN];
            word.copy_from_slice(chunk);
            word
        })
        .collect())
}

fn word_at(words: &[[u8; WORD_LEN]], index: usize) -> Result<[u8; WORD_LEN], Error> {
    words
        .get(index)
        .copied()
        .ok_or_else(|| Error::Contract(format!("call result has no word {}", index)))
}

/// Decode the first word of a result as uint256
pub fn decode_uint(data: &str) -> Result<Uint256, Error> {
    let words = decode_words(data)?;
    Ok(Uint256::from_be_bytes(word_at(&words, 0)?))
}

/// Decode the first word of a result as an address
pub fn decode_address(data: &str) -> Result<TronAddress, Error> {
    let words = decode_words(data)?;
    let word = word_at(&words, 0)?;
    let mut id = [0u8; 20];
    id.copy_from_slice(&word[12..]);
    Ok(TronAddress::from_account_id(id))
}

/// Decode a dynamic `string` return value.
///
/// Some early TRC-20 tokens return `bytes32` for `symbol()`; a single word
/// result is read as a NUL-padded fixed string.
pub fn decode_string(data: &str) -> Result<String, Error> {
    let words = decode_words(data)?;
    if words.len() == 1 {
        let word = word_at(&words, 0)?;
        let end = word.iter().position(|b| *b == 0).unwrap_or(WORD_LEN);
        return Ok(String::from_utf8_lossy(&word[..end]).into_owned());
    }

    let offset = word_to_usize(&word_at(&words, 0)?)? / WORD_LEN;
    let len = word_to_usize(&word_at(&words, offset)?)?;
    let bytes: Vec<u8> = words
        .iter()
        .skip(offset + 1)
        .flat_map(|w| w.iter().copied())
        .take(len)
        .collect();
    if bytes.len() < len {
        return Err(Error::Contract("truncated string in call result".to_string()));
    }
    String::from_utf8(bytes).map_err(|e| Error::Contract(format!("invalid utf-8 string: {}", e)))
}

fn word_to_usize(word: &[u8; WORD_LEN]) -> Result<usize, Error> {
    if word[..WORD_LEN - 8].iter().any(|b| *b != 0) {
        return Err(Error::Contract("length word out of range".to_string()));
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[WORD_LEN - 8..]);
    usize::try_from(u64::from_be_bytes(tail))
        .map_err(|_| Error::Contract("length word out of range".to_string()))
}

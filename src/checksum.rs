/// the Internet checksum (RFC 1071)
///
/// 16-bit words are read in network byte order, a trailing odd byte is
/// padded with a zero low byte, carries are folded back in, and the
/// one's complement of the folded sum is returned.
pub fn checksum(data: &[u8]) -> u16 {
    !fold(sum_words(data))
}

/// one's complement sum of `data` before complementing
pub fn sum_words(data: &[u8]) -> u64 {
    let mut chunks = data.chunks_exact(2);
    let mut sum: u64 = chunks
        .by_ref()
        .map(|word| u16::from_be_bytes([word[0], word[1]]) as u64)
        .sum();
    if let Some(&byte) = chunks.remainder().first() {
        sum += (byte as u64) << 8;
    }
    sum
}

fn fold(mut sum: u64) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    sum as u16
}

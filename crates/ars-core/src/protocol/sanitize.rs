//! Line-ending repair for binary output carried over a text-mode shell.
//!
//! `adb shell` allocates a pseudo-terminal on older devices.  When the device
//! command writes a `\r` followed by a `\n`, the terminal injects its own
//! carriage return, so a literal `\r\n` inside a PNG comes back as
//! `\r\r\n`.  Collapsing each `0D 0D 0A` triplet to `0D 0A` in one forward
//! pass restores the original bytes.
//!
//! The repair must run exactly once per captured stream: a clean stream
//! that itself contains `0D 0D 0A` would be damaged by a second pass.

const CR: u8 = 0x0D;
const LF: u8 = 0x0A;

/// Repairs `buf` in place and returns the number of corrected triplets.
///
/// The buffer shrinks by exactly one byte per correction.
pub fn sanitize_in_place(buf: &mut Vec<u8>) -> usize {
    let len = buf.len();
    let mut read = 0;
    let mut write = 0;
    let mut corrected = 0;

    while read < len {
        if read + 2 < len && buf[read] == CR && buf[read + 1] == CR && buf[read + 2] == LF {
            // Drop the injected CR and continue with the real CR LF.
            read += 1;
            corrected += 1;
        }
        buf[write] = buf[read];
        write += 1;
        read += 1;
    }

    buf.truncate(write);
    corrected
}

/// Returns a repaired copy of `bytes`.
pub fn sanitize(bytes: &[u8]) -> Vec<u8> {
    let mut buf = bytes.to_vec();
    sanitize_in_place(&mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    /// What the pty does to a clean stream: a CR directly before an LF is doubled.
    fn corrupt(clean: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(clean.len() * 2);
        for &b in clean {
            if b == LF && out.last() == Some(&CR) {
                out.push(CR);
            }
            out.push(b);
        }
        out
    }

    /// Small deterministic generator so the property tests cover many
    /// streams without an extra dependency.
    fn pseudo_random_streams() -> Vec<Vec<u8>> {
        let alphabet = [CR, LF, b'P', b'N', b'G', 0x00, 0xFF];
        let mut state: u32 = 0x1234_5678;
        (0..200)
            .map(|n| {
                (0..(n % 40))
                    .map(|_| {
                        state ^= state << 13;
                        state ^= state >> 17;
                        state ^= state << 5;
                        alphabet[(state % alphabet.len() as u32) as usize]
                    })
                    .collect()
            })
            .collect()
    }

    fn contains_triplet(bytes: &[u8]) -> bool {
        bytes.windows(3).any(|w| w == [CR, CR, LF])
    }

    #[test]
    fn test_sanitize_collapses_single_triplet() {
        let mut buf = vec![b'a', CR, CR, LF, b'b'];

        let corrected = sanitize_in_place(&mut buf);

        assert_eq!(buf, vec![b'a', CR, LF, b'b']);
        assert_eq!(corrected, 1);
    }

    #[test]
    fn test_sanitize_leaves_clean_stream_untouched() {
        let clean = vec![0x89, b'P', b'N', b'G', CR, LF, 0x1A, LF];

        assert_eq!(sanitize(&clean), clean);
    }

    #[test]
    fn test_sanitize_handles_triplet_at_end_and_lone_cr() {
        assert_eq!(sanitize(&[CR, CR, LF]), vec![CR, LF]);
        assert_eq!(sanitize(&[CR, CR]), vec![CR, CR]);
        assert_eq!(sanitize(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_sanitize_recovers_clean_stream_from_pty_corruption() {
        for clean in pseudo_random_streams() {
            let dirty = corrupt(&clean);

            assert_eq!(sanitize(&dirty), clean, "stream {clean:?}");
        }
    }

    #[test]
    fn test_sanitize_length_drops_one_byte_per_correction() {
        for clean in pseudo_random_streams() {
            let mut buf = corrupt(&clean);
            let before = buf.len();

            let corrected = sanitize_in_place(&mut buf);

            assert_eq!(buf.len(), before - corrected);
        }
    }

    #[test]
    fn test_sanitize_is_idempotent_on_repaired_output() {
        for clean in pseudo_random_streams()
            .into_iter()
            .filter(|s| !contains_triplet(s))
        {
            let once = sanitize(&corrupt(&clean));

            assert_eq!(sanitize(&once), once);
        }
    }
}

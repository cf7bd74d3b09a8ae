//! Prime sizing helpers.
//!
//! Quadratic probing over a prime modulus visits at least `(p + 1) / 2`
//! distinct slots before repeating, so a table kept under half load always
//! finds a free slot. Every capacity the table takes on comes from here.

/// Returns `true` if `n` is prime.
///
/// `0` and `1` are not prime.
///
/// # Examples
///
/// ```rust
/// # use quadprobe::prime::is_prime;
/// #
/// assert!(is_prime(2));
/// assert!(is_prime(17));
/// assert!(!is_prime(1));
/// assert!(!is_prime(15));
/// ```
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }

    let mut divisor = 3usize;
    while divisor <= n / divisor {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }

    true
}

/// Returns the smallest prime greater than or equal to `n`, or `None` if no
/// such prime fits in a `usize`.
///
/// # Examples
///
/// ```rust
/// # use quadprobe::prime::next_prime;
/// #
/// assert_eq!(next_prime(0), Some(2));
/// assert_eq!(next_prime(15), Some(17));
/// assert_eq!(next_prime(17), Some(17));
/// ```
pub fn next_prime(n: usize) -> Option<usize> {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        candidate = candidate.checked_add(1)?;
    }
    Some(candidate)
}

/// Capacity a table of `capacity` slots grows to on rehash: the first prime
/// at or above `2 * capacity + 1`.
///
/// # Examples
///
/// ```rust
/// # use quadprobe::prime::grown_capacity;
/// #
/// assert_eq!(grown_capacity(7), Some(17));
/// assert_eq!(grown_capacity(17), Some(37));
/// ```
pub fn grown_capacity(capacity: usize) -> Option<usize> {
    let base = capacity.checked_mul(2)?.checked_add(1)?;
    next_prime(base)
}

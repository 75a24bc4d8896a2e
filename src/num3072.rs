//! Arithmetic on 3072-bit integers modulo the safe prime 2^3072 - 1103717.
//!
//! Values are 48 little-endian u64 limbs. Intermediate results are allowed to
//! stay in [0, 2*P) between operations; `full_reduce` brings them below P.

/// Number of 64-bit limbs in a 3072-bit integer.
pub(crate) const LIMBS: usize = 48;
/// Width of one limb in bits.
const LIMB_SIZE: usize = 64;
/// 2^3072 - MAX_PRIME_DIFF is the group modulus, the largest 3072-bit safe prime.
pub(crate) const MAX_PRIME_DIFF: u64 = 1103717;

type Limb = u64;
type DoubleLimb = u128;

/// A nonnegative integer below 2^3072, in little-endian limb order.
#[derive(Clone, Copy)]
pub(crate) struct Num3072 {
    pub(crate) limbs: [Limb; LIMBS],
}

/// Extract the lowest limb of [c0,c1,c2] and shift the accumulator down by one limb.
#[inline]
fn extract3(c0: &mut Limb, c1: &mut Limb, c2: &mut Limb) -> Limb {
    let n = *c0;
    *c0 = *c1;
    *c1 = *c2;
    *c2 = 0;
    n
}

/// Extract the lowest limb of [c0,c1] and shift the accumulator down by one limb.
#[inline]
fn extract2(c0: &mut Limb, c1: &mut Limb) -> Limb {
    let n = *c0;
    *c0 = *c1;
    *c1 = 0;
    n
}

/// [lo,hi] = a * b
#[inline]
fn mul_wide(a: Limb, b: Limb) -> (Limb, Limb) {
    let t = (a as DoubleLimb) * (b as DoubleLimb);
    (t as Limb, (t >> LIMB_SIZE) as Limb)
}

/// [c0,c1,c2] += n * [d0,d1,d2]. Requires c2 == 0 on entry; n is small enough
/// that n * u64::MAX fits a double limb plus one bit.
#[inline]
fn mulnadd3(c0: &mut Limb, c1: &mut Limb, c2: &mut Limb, d0: Limb, d1: Limb, d2: Limb, n: Limb) {
    let mut t = (d0 as DoubleLimb) * (n as DoubleLimb) + (*c0 as DoubleLimb);
    *c0 = t as Limb;
    t >>= LIMB_SIZE;
    t += (d1 as DoubleLimb) * (n as DoubleLimb) + (*c1 as DoubleLimb);
    *c1 = t as Limb;
    t >>= LIMB_SIZE;
    *c2 = (t as Limb).wrapping_add(d2.wrapping_mul(n));
}

/// [c0,c1] *= n
#[inline]
fn muln2(c0: &mut Limb, c1: &mut Limb, n: Limb) {
    let mut t = (*c0 as DoubleLimb) * (n as DoubleLimb);
    *c0 = t as Limb;
    t >>= LIMB_SIZE;
    t += (*c1 as DoubleLimb) * (n as DoubleLimb);
    *c1 = t as Limb;
}

/// [c0,c1,c2] += a * b
#[inline]
fn muladd3(c0: &mut Limb, c1: &mut Limb, c2: &mut Limb, a: Limb, b: Limb) {
    let (tl, th) = mul_wide(a, b);
    *c0 = c0.wrapping_add(tl);
    let th = th + (*c0 < tl) as Limb;
    *c1 = c1.wrapping_add(th);
    *c2 += (*c1 < th) as Limb;
}

/// [c0,c1,c2] += 2 * a * b
#[inline]
fn muldbladd3(c0: &mut Limb, c1: &mut Limb, c2: &mut Limb, a: Limb, b: Limb) {
    let (tl, th) = mul_wide(a, b);
    *c0 = c0.wrapping_add(tl);
    let tt = th + (*c0 < tl) as Limb;
    *c1 = c1.wrapping_add(tt);
    *c2 += (*c1 < tt) as Limb;
    *c0 = c0.wrapping_add(tl);
    let th = th + (*c0 < tl) as Limb;
    *c1 = c1.wrapping_add(th);
    *c2 += (*c1 < th) as Limb;
}

/// [c0,c1] += a
#[inline]
fn add2(c0: &mut Limb, c1: &mut Limb, a: Limb) {
    *c0 = c0.wrapping_add(a);
    *c1 += (*c0 < a) as Limb;
}

impl Num3072 {
    /// The multiplicative identity of the group.
    pub(crate) fn one() -> Self {
        let mut limbs = [0; LIMBS];
        limbs[0] = 1;
        Self { limbs }
    }

    /// Whether the value is >= the modulus.
    pub(crate) fn is_overflow(&self) -> bool {
        if self.limbs[0] <= Limb::MAX - MAX_PRIME_DIFF {
            return false;
        }
        self.limbs[1..].iter().all(|&limb| limb == Limb::MAX)
    }

    /// Subtract the modulus once. Since 2^3072 = MAX_PRIME_DIFF (mod P), this
    /// is an add of MAX_PRIME_DIFF with the carry out of the top limb dropped.
    /// Any input in [0, 2*P) ends up below P.
    pub(crate) fn full_reduce(&mut self) {
        let mut c0 = MAX_PRIME_DIFF;
        let mut c1 = 0;
        for i in 0..LIMBS {
            add2(&mut c0, &mut c1, self.limbs[i]);
            self.limbs[i] = extract2(&mut c0, &mut c1);
        }
    }

    /// self = self * a mod P, by schoolbook multiplication with the high half
    /// folded back in through the 2^3072 = MAX_PRIME_DIFF identity.
    pub(crate) fn multiply(&mut self, a: &Num3072) {
        let mut c0: Limb = 0;
        let mut c1: Limb = 0;
        let mut tmp = Num3072 { limbs: [0; LIMBS] };

        /* Limbs 0..N-2 of self*a into tmp, with one reduction folded in. */
        for j in 0..LIMBS - 1 {
            let mut c2: Limb = 0;
            let (mut d0, mut d1) = mul_wide(self.limbs[1 + j], a.limbs[LIMBS - 1]);
            let mut d2: Limb = 0;
            for i in 2 + j..LIMBS {
                muladd3(&mut d0, &mut d1, &mut d2, self.limbs[i], a.limbs[LIMBS + j - i]);
            }
            mulnadd3(&mut c0, &mut c1, &mut c2, d0, d1, d2, MAX_PRIME_DIFF);
            for i in 0..j + 1 {
                muladd3(&mut c0, &mut c1, &mut c2, self.limbs[i], a.limbs[j - i]);
            }
            tmp.limbs[j] = extract3(&mut c0, &mut c1, &mut c2);
        }
        /* Limb N-1. */
        {
            let mut c2: Limb = 0;
            for i in 0..LIMBS {
                muladd3(&mut c0, &mut c1, &mut c2, self.limbs[i], a.limbs[LIMBS - 1 - i]);
            }
            tmp.limbs[LIMBS - 1] = extract3(&mut c0, &mut c1, &mut c2);
        }
        /* Second reduction. */
        muln2(&mut c0, &mut c1, MAX_PRIME_DIFF);
        for j in 0..LIMBS {
            add2(&mut c0, &mut c1, tmp.limbs[j]);
            self.limbs[j] = extract2(&mut c0, &mut c1);
        }
        debug_assert!(c1 == 0);
        debug_assert!(c0 == 0 || c0 == 1);
        /* A potential third reduction. */
        if c0 != 0 {
            self.full_reduce();
        }
    }

    /// self = self^2 mod P. Same schedule as `multiply`, with the symmetric
    /// off-diagonal products counted once and doubled.
    pub(crate) fn square(&mut self) {
        let mut c0: Limb = 0;
        let mut c1: Limb = 0;
        let mut tmp = Num3072 { limbs: [0; LIMBS] };

        /* Limbs 0..N-2 of self*self into tmp, with one reduction folded in. */
        for j in 0..LIMBS - 1 {
            let mut d0: Limb = 0;
            let mut d1: Limb = 0;
            let mut d2: Limb = 0;
            let mut c2: Limb = 0;
            for i in 0..(LIMBS - 1 - j) / 2 {
                muldbladd3(&mut d0, &mut d1, &mut d2, self.limbs[i + j + 1], self.limbs[LIMBS - 1 - i]);
            }
            if (j + 1) & 1 != 0 {
                muladd3(
                    &mut d0,
                    &mut d1,
                    &mut d2,
                    self.limbs[(LIMBS - 1 - j) / 2 + j + 1],
                    self.limbs[LIMBS - 1 - (LIMBS - 1 - j) / 2],
                );
            }
            mulnadd3(&mut c0, &mut c1, &mut c2, d0, d1, d2, MAX_PRIME_DIFF);
            for i in 0..(j + 1) / 2 {
                muldbladd3(&mut c0, &mut c1, &mut c2, self.limbs[i], self.limbs[j - i]);
            }
            if (j + 1) & 1 != 0 {
                muladd3(&mut c0, &mut c1, &mut c2, self.limbs[(j + 1) / 2], self.limbs[j - (j + 1) / 2]);
            }
            tmp.limbs[j] = extract3(&mut c0, &mut c1, &mut c2);
        }
        /* Limb N-1. */
        {
            let mut c2: Limb = 0;
            for i in 0..LIMBS / 2 {
                muldbladd3(&mut c0, &mut c1, &mut c2, self.limbs[i], self.limbs[LIMBS - 1 - i]);
            }
            tmp.limbs[LIMBS - 1] = extract3(&mut c0, &mut c1, &mut c2);
        }
        /* Second reduction. */
        muln2(&mut c0, &mut c1, MAX_PRIME_DIFF);
        for j in 0..LIMBS {
            add2(&mut c0, &mut c1, tmp.limbs[j]);
            self.limbs[j] = extract2(&mut c0, &mut c1);
        }
        debug_assert!(c1 == 0);
        debug_assert!(c0 == 0 || c0 == 1);
        /* A potential third reduction. */
        if c0 != 0 {
            self.full_reduce();
        }
    }

    /// self^(P-2) mod P, the multiplicative inverse by Fermat's little theorem.
    ///
    /// Sliding-window exponentiation over precomputed repunit powers
    /// p[i] = self^(2^(2^i) - 1), after "Fast Point Decompression for Standard
    /// Elliptic Curves" (Brumley, Jarvinen 2008). The squaring/multiply
    /// schedule below spells out the binary expansion of P - 2 and must not be
    /// altered. Requires self != 0 mod P.
    pub(crate) fn inverse(&self) -> Num3072 {
        let mut p = [*self; 12];
        for i in 0..11 {
            let mut next = p[i];
            for _ in 0..(1 << i) {
                next.square();
            }
            next.multiply(&p[i]);
            p[i + 1] = next;
        }

        const CHAIN: [(usize, usize); 14] = [
            (512, 9),
            (256, 8),
            (128, 7),
            (64, 6),
            (32, 5),
            (8, 3),
            (2, 1),
            (1, 0),
            (5, 2),
            (3, 0),
            (2, 0),
            (4, 0),
            (4, 1),
            (3, 0),
        ];

        let mut x = p[11];
        for (squarings, window) in CHAIN {
            for _ in 0..squarings {
                x.square();
            }
            x.multiply(&p[window]);
        }
        x
    }

    /// Parse 384 little-endian bytes.
    pub(crate) fn from_le_bytes(bytes: &[u8; LIMBS * 8]) -> Self {
        let mut limbs = [0; LIMBS];
        for i in 0..LIMBS {
            let mut limb = [0u8; 8];
            limb.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            limbs[i] = Limb::from_le_bytes(limb);
        }
        Self { limbs }
    }

    /// Emit 384 little-endian bytes.
    pub(crate) fn to_le_bytes(&self) -> [u8; LIMBS * 8] {
        let mut bytes = [0u8; LIMBS * 8];
        for i in 0..LIMBS {
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&self.limbs[i].to_le_bytes());
        }
        bytes
    }
}

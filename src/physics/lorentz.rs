use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A four-vector `(t, x, y, z)` with the mostly-minus metric.
///
/// Used both for momenta (GeV) and for space-time positions (mm).
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LorentzVector {
    pub t: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl fmt::Display for LorentzVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "(t:{}, x:{}, y:{}, z:{})",
            self.t, self.x, self.y, self.z
        )
    }
}

impl LorentzVector {
    #[inline]
    pub fn new() -> LorentzVector {
        LorentzVector::default()
    }

    #[inline]
    pub fn from_args(t: f64, x: f64, y: f64, z: f64) -> LorentzVector {
        LorentzVector { t, x, y, z }
    }

    /// Build an on-shell momentum from its spatial part and a mass.
    #[inline]
    pub fn on_shell(x: f64, y: f64, z: f64, mass: f64) -> LorentzVector {
        let e = (x * x + y * y + z * z + mass * mass).sqrt();
        LorentzVector { t: e, x, y, z }
    }

    /// Build an on-shell momentum from (pT, eta, phi, m).
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, mass: f64) -> LorentzVector {
        let (sin_phi, cos_phi) = phi.sin_cos();
        LorentzVector::on_shell(pt * cos_phi, pt * sin_phi, pt * eta.sinh(), mass)
    }

    #[inline]
    pub fn square(&self) -> f64 {
        self.t * self.t - self.x * self.x - self.y * self.y - self.z * self.z
    }

    #[inline]
    pub fn dot(&self, other: &LorentzVector) -> f64 {
        self.t * other.t - self.x * other.x - self.y * other.y - self.z * other.z
    }

    #[inline]
    pub fn spatial_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn spatial_dot(&self, other: &LorentzVector) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn spatial_distance(&self) -> f64 {
        self.spatial_squared().sqrt()
    }

    /// Invariant mass; negative squares (numerical noise) map to zero.
    pub fn mass(&self) -> f64 {
        let m2 = self.square();
        if m2 > 0. { m2.sqrt() } else { 0. }
    }

    /// Transverse component with respect to the beam (z) axis.
    #[inline]
    pub fn pt(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Magnitude of the three-momentum.
    #[inline]
    pub fn p3mod(&self) -> f64 {
        self.spatial_distance()
    }

    #[inline]
    pub fn phi(&self) -> f64 {
        self.y.atan2(self.x)
    }

    #[inline]
    pub fn theta(&self) -> f64 {
        self.pt().atan2(self.z)
    }

    /// Pseudorapidity. Infinite along the beam axis.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0. {
            return if self.z >= 0. {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            };
        }
        (self.z / pt).asinh()
    }

    /// Velocity vector `p/E`, suitable as a boost argument.
    #[inline]
    pub fn velocity(&self) -> LorentzVector {
        LorentzVector::from_args(0., self.x / self.t, self.y / self.t, self.z / self.t)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.t == 0. && self.x == 0. && self.y == 0. && self.z == 0.
    }

    /// Boost by the velocity stored in the spatial part of `boost_vector`.
    pub fn boost(&self, boost_vector: &LorentzVector) -> LorentzVector {
        let b2 = boost_vector.spatial_squared();
        let gamma = 1. / (1. - b2).sqrt();

        let bp = self.spatial_dot(boost_vector);
        let gamma2 = if b2 > 0. { (gamma - 1.) / b2 } else { 0. };
        let factor = gamma2 * bp + gamma * self.t;
        LorentzVector::from_args(
            gamma * (self.t + bp),
            boost_vector.x.mul_add(factor, self.x),
            boost_vector.y.mul_add(factor, self.y),
            boost_vector.z.mul_add(factor, self.z),
        )
    }
}

impl Add for LorentzVector {
    type Output = LorentzVector;

    #[inline]
    fn add(self, other: LorentzVector) -> LorentzVector {
        LorentzVector::from_args(
            self.t + other.t,
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
        )
    }
}

impl AddAssign for LorentzVector {
    #[inline]
    fn add_assign(&mut self, other: LorentzVector) {
        *self = *self + other;
    }
}

impl Sub for LorentzVector {
    type Output = LorentzVector;

    #[inline]
    fn sub(self, other: LorentzVector) -> LorentzVector {
        LorentzVector::from_args(
            self.t - other.t,
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
        )
    }
}

impl Mul<f64> for LorentzVector {
    type Output = LorentzVector;

    #[inline]
    fn mul(self, other: f64) -> LorentzVector {
        LorentzVector::from_args(self.t * other, self.x * other, self.y * other, self.z * other)
    }
}

impl Neg for LorentzVector {
    type Output = LorentzVector;

    #[inline]
    fn neg(self) -> LorentzVector {
        LorentzVector::from_args(-self.t, -self.x, -self.y, -self.z)
    }
}

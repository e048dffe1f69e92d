//! # Approximate planetary elements (JPL, E. M. Standish)
//!
//! Linear-in-time Keplerian elements of the major planets, referred to the
//! mean ecliptic and equinox of J2000, from *Keplerian Elements for
//! Approximate Positions of the Major Planets* (JPL Solar System Dynamics).
//!
//! Two fits are bundled:
//!
//! * **Table 1**, valid 1800 AD – 2050 AD, used whenever the date falls inside it;
//! * **Table 2a**, valid 3000 BC – 3000 AD, together with the **Table 2b**
//!   periodic corrections to the mean anomaly of Jupiter … Pluto.
//!
//! Each element is `x₀ + ẋ·T` with `T` in Julian centuries from J2000.0 (TDB).
//! Dates outside 3000 BC – 3000 AD raise [`EphemError::DateOutOfRange`].
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    constants::{AstronomicalUnit, Degree, JulianDate, RADEG},
    ephem_errors::EphemError,
    orbit_type::OrbitalElements,
    time::{julian_centuries_since_j2000, julian_year},
};

/// Bodies of the tabulated (planetary) ephemeris.
///
/// `Earth` stands for the Earth–Moon barycenter, the body JPL fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Planet {
    Sun,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Planet {
    pub const ALL: [Planet; 10] = [
        Planet::Sun,
        Planet::Mercury,
        Planet::Venus,
        Planet::Earth,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
        Planet::Pluto,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Planet::Sun => "Sun",
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Earth => "Earth",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
            Planet::Pluto => "Pluto",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Planet> {
        Planet::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which fit produced a set of elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermTable {
    /// Table 1, 1800 AD – 2050 AD.
    Modern,
    /// Tables 2a + 2b, 3000 BC – 3000 AD.
    LongRange,
}

/// Value and rate per Julian century of each element:
/// `a` (AU), `e`, `I`, `L`, `ϖ`, `Ω` (degrees).
#[derive(Debug, Clone, Copy, PartialEq)]
struct SecularTerms {
    a: [f64; 2],
    e: [f64; 2],
    i: [f64; 2],
    l: [f64; 2],
    lon_peri: [f64; 2],
    node: [f64; 2],
}

/// Table 2b: `M += b·T² + c·cos(f·T) + s·sin(f·T)`, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PeriodicTerms {
    b: f64,
    c: f64,
    s: f64,
    f: f64,
}

const fn terms(
    a: [f64; 2],
    e: [f64; 2],
    i: [f64; 2],
    l: [f64; 2],
    lon_peri: [f64; 2],
    node: [f64; 2],
) -> SecularTerms {
    SecularTerms {
        a,
        e,
        i,
        l,
        lon_peri,
        node,
    }
}

#[rustfmt::skip]
const TABLE_1: [SecularTerms; 9] = [
    // Mercury
    terms([0.38709927, 0.00000037], [0.20563593, 0.00001906], [7.00497902, -0.00594749],
          [252.25032350, 149472.67411175], [77.45779628, 0.16047689], [48.33076593, -0.12534081]),
    // Venus
    terms([0.72333566, 0.00000390], [0.00677672, -0.00004107], [3.39467605, -0.00078890],
          [181.97909950, 58517.81538729], [131.60246718, 0.00268329], [76.67984255, -0.27769418]),
    // Earth-Moon barycenter
    terms([1.00000261, 0.00000562], [0.01671123, -0.00004392], [-0.00001531, -0.01294668],
          [100.46457166, 35999.37244981], [102.93768193, 0.32327364], [0.0, 0.0]),
    // Mars
    terms([1.52371034, 0.00001847], [0.09339410, 0.00007882], [1.84969142, -0.00813131],
          [-4.55343205, 19140.30268499], [-23.94362959, 0.44441088], [49.55953891, -0.29257343]),
    // Jupiter
    terms([5.20288700, -0.00011607], [0.04838624, -0.00013253], [1.30439695, -0.00183714],
          [34.39644051, 3034.74612775], [14.72847983, 0.21252668], [100.47390909, 0.20469106]),
    // Saturn
    terms([9.53667594, -0.00125060], [0.05386179, -0.00050991], [2.48599187, 0.00193609],
          [49.95424423, 1222.49362201], [92.59887831, -0.41897216], [113.66242448, -0.28867794]),
    // Uranus
    terms([19.18916464, -0.00196176], [0.04725744, -0.00004397], [0.77263783, -0.00242939],
          [313.23810451, 428.48202785], [170.95427630, 0.40805281], [74.01692503, 0.04240589]),
    // Neptune
    terms([30.06992276, 0.00026291], [0.00859048, 0.00005105], [1.77004347, 0.00035372],
          [-55.12002969, 218.45945325], [44.96476227, -0.32241464], [131.78422574, -0.00508664]),
    // Pluto
    terms([39.48211675, -0.00031596], [0.24882730, 0.00005170], [17.14001206, 0.00004818],
          [238.92903833, 145.20780515], [224.06891629, -0.04062942], [110.30393684, -0.01183482]),
];

#[rustfmt::skip]
const TABLE_2A: [SecularTerms; 9] = [
    // Mercury
    terms([0.38709843, 0.00000000], [0.20563661, 0.00002123], [7.00559432, -0.00590158],
          [252.25166724, 149472.67486623], [77.45771895, 0.15940013], [48.33961819, -0.12214182]),
    // Venus
    terms([0.72332102, -0.00000026], [0.00676399, -0.00005107], [3.39777545, 0.00043494],
          [181.97970850, 58517.81560260], [131.76755713, 0.05679648], [76.67261496, -0.27274174]),
    // Earth-Moon barycenter
    terms([1.00000018, -0.00000003], [0.01673163, -0.00003661], [-0.00054346, -0.01337178],
          [100.46691572, 35999.37306329], [102.93005885, 0.31795260], [-5.11260389, -0.24123856]),
    // Mars
    terms([1.52371243, 0.00000097], [0.09336511, 0.00009149], [1.85181869, -0.00724757],
          [-4.56813164, 19140.29934243], [-23.91744784, 0.45223625], [49.71320984, -0.26852431]),
    // Jupiter
    terms([5.20248019, -0.00002864], [0.04853590, 0.00018026], [1.29861416, -0.00322699],
          [34.33479152, 3034.90371757], [14.27495244, 0.18199196], [100.29282654, 0.13024619]),
    // Saturn
    terms([9.54149883, -0.00003065], [0.05550825, -0.00032044], [2.49424102, 0.00451969],
          [50.07571329, 1222.11494724], [92.86136063, 0.54179478], [113.63998702, -0.25015002]),
    // Uranus
    terms([19.18797948, -0.00020455], [0.04685740, -0.00001550], [0.77298127, -0.00180155],
          [314.20276625, 428.49512595], [172.43404441, 0.09266985], [73.96250215, 0.05739699]),
    // Neptune
    terms([30.06952752, 0.00006447], [0.00895439, 0.00000818], [1.77005520, 0.00022400],
          [304.22289287, 218.46515314], [46.68158724, 0.01009938], [131.78635853, -0.00606302]),
    // Pluto
    terms([39.48686035, 0.00449751], [0.24885238, 0.00006016], [17.14104260, 0.00000501],
          [238.96535011, 145.18042903], [224.09702598, -0.00968827], [110.30167986, -0.00809981]),
];

#[rustfmt::skip]
const TABLE_2B: [Option<PeriodicTerms>; 9] = [
    None,
    None,
    None,
    None,
    // Jupiter
    Some(PeriodicTerms { b: -0.00012452, c: 0.06064060, s: -0.35635438, f: 38.35125000 }),
    // Saturn
    Some(PeriodicTerms { b: 0.00025899, c: -0.13434469, s: 0.87320147, f: 38.35125000 }),
    // Uranus
    Some(PeriodicTerms { b: 0.00058331, c: -0.97731848, s: 0.17689245, f: 7.67025000 }),
    // Neptune
    Some(PeriodicTerms { b: -0.00041348, c: 0.68346318, s: -0.10162547, f: 7.67025000 }),
    // Pluto
    Some(PeriodicTerms { b: -0.01262724, c: 0.0, s: 0.0, f: 0.0 }),
];

const MODERN_WINDOW: (f64, f64) = (1800.0, 2050.0);
const LONG_RANGE_WINDOW: (f64, f64) = (-3000.0, 3000.0);

/// Raw element values for one planet at one date, as read from the tables.
///
/// Angles are in degrees; `mean_anomaly_correction` is the Table 2b term
/// (zero for Table 1 and for Mercury … Mars).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPlanetElements {
    pub planet: Planet,
    pub julian_date: JulianDate,
    pub table: TermTable,
    pub semi_major_axis: AstronomicalUnit,
    pub eccentricity: f64,
    pub inclination: Degree,
    pub mean_longitude: Degree,
    pub longitude_of_perihelion: Degree,
    pub ascending_node: Degree,
    pub mean_anomaly_correction: Degree,
}

impl RawPlanetElements {
    /// Mean anomaly `M = L − ϖ` plus the Table 2b correction, degrees.
    pub fn mean_anomaly(&self) -> Degree {
        self.mean_longitude - self.longitude_of_perihelion + self.mean_anomaly_correction
    }

    /// Osculating elements at the evaluation date.
    ///
    /// The periodic correction is folded into the mean longitude, so that
    /// `L − ϖ` of the result is the corrected mean anomaly.
    pub fn to_orbital_elements(&self) -> Result<OrbitalElements, EphemError> {
        OrbitalElements::planet_jd(
            self.julian_date,
            self.semi_major_axis,
            self.eccentricity,
            self.inclination * RADEG,
            self.longitude_of_perihelion * RADEG,
            self.ascending_node * RADEG,
            (self.mean_longitude + self.mean_anomaly_correction) * RADEG,
        )
    }
}

fn table_index(planet: Planet) -> Result<usize, EphemError> {
    match planet {
        Planet::Sun => Err(EphemError::BodyNotFound(
            "the Sun has no heliocentric orbital elements".into(),
        )),
        Planet::Mercury => Ok(0),
        Planet::Venus => Ok(1),
        Planet::Earth => Ok(2),
        Planet::Mars => Ok(3),
        Planet::Jupiter => Ok(4),
        Planet::Saturn => Ok(5),
        Planet::Uranus => Ok(6),
        Planet::Neptune => Ok(7),
        Planet::Pluto => Ok(8),
    }
}

/// Pick the fit covering a date.
///
/// Errors
/// ----------
/// * [`EphemError::DateOutOfRange`] outside 3000 BC – 3000 AD.
pub fn select_table(julian_date: JulianDate) -> Result<TermTable, EphemError> {
    let year = julian_year(julian_date);
    if (MODERN_WINDOW.0..=MODERN_WINDOW.1).contains(&year) {
        Ok(TermTable::Modern)
    } else if (LONG_RANGE_WINDOW.0..=LONG_RANGE_WINDOW.1).contains(&year) {
        Ok(TermTable::LongRange)
    } else {
        Err(EphemError::DateOutOfRange {
            julian_date,
            valid: "3000 BC to 3000 AD",
        })
    }
}

/// Evaluate the tables for `planet` at `julian_date` (TDB).
///
/// Errors
/// ----------
/// * [`EphemError::DateOutOfRange`] outside 3000 BC – 3000 AD.
/// * [`EphemError::BodyNotFound`] for [`Planet::Sun`].
pub fn evaluate(planet: Planet, julian_date: JulianDate) -> Result<RawPlanetElements, EphemError> {
    let index = table_index(planet)?;
    let table = select_table(julian_date)?;
    let t = julian_centuries_since_j2000(julian_date);

    let (row, periodic) = match table {
        TermTable::Modern => (&TABLE_1[index], None),
        TermTable::LongRange => (&TABLE_2A[index], TABLE_2B[index].as_ref()),
    };
    let at = |x: &[f64; 2]| x[0] + x[1] * t;

    let mean_anomaly_correction = periodic.map_or(0.0, |p| {
        let arg = (p.f * t) * RADEG;
        p.b * t * t + p.c * arg.cos() + p.s * arg.sin()
    });

    Ok(RawPlanetElements {
        planet,
        julian_date,
        table,
        semi_major_axis: at(&row.a),
        eccentricity: at(&row.e),
        inclination: at(&row.i),
        mean_longitude: at(&row.l),
        longitude_of_perihelion: at(&row.lon_peri),
        ascending_node: at(&row.node),
        mean_anomaly_correction,
    })
}

/// [`evaluate`] followed by [`RawPlanetElements::to_orbital_elements`].
pub fn planet_elements(planet: Planet, julian_date: JulianDate) -> Result<OrbitalElements, EphemError> {
    evaluate(planet, julian_date)?.to_orbital_elements()
}

//! Static sector reference data: demo cohorts, absolute benchmark
//! thresholds and best practices.
//!
//! Five sectors are known. Anything else borrows the IT data.

use cm_core::enums::PracticeLevel;
use cm_core::responses::SectorThresholds;

/// A synthetic cohort member. Annual tCO2e.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoOrg {
    pub name: &'static str,
    pub employees: i64,
    pub total_emissions: f64,
}

/// Reference data for one sector.
#[derive(Debug)]
pub struct SectorProfile {
    pub name: &'static str,
    pub demo: &'static [DemoOrg],
    pub thresholds: SectorThresholds,
    high: [&'static str; 5],
    medium: [&'static str; 5],
    low: [&'static str; 5],
}

impl SectorProfile {
    #[must_use]
    pub fn practices(&self, level: PracticeLevel) -> Vec<String> {
        let list = match level {
            PracticeLevel::High => &self.high,
            PracticeLevel::Medium => &self.medium,
            PracticeLevel::Low => &self.low,
        };
        list.iter().map(|s| (*s).to_string()).collect()
    }
}

const fn demo(name: &'static str, employees: i64, total_emissions: f64) -> DemoOrg {
    DemoOrg {
        name,
        employees,
        total_emissions,
    }
}

const fn thresholds(excellent: f64, good: f64, average: f64, needs_improvement: f64) -> SectorThresholds {
    SectorThresholds {
        excellent,
        good,
        average,
        needs_improvement,
    }
}

static IT: SectorProfile = SectorProfile {
    name: "IT",
    demo: &[
        demo("Infosys", 80_000, 168_000.0),
        demo("TCS", 100_000, 240_000.0),
        demo("Wipro", 70_000, 182_000.0),
        demo("HCL Technologies", 60_000, 138_000.0),
        demo("Tech Mahindra", 50_000, 125_000.0),
    ],
    thresholds: thresholds(2.0, 2.5, 3.0, 3.5),
    high: [
        "Migrate to energy-efficient cloud infrastructure",
        "Implement server virtualization to reduce hardware",
        "Switch to renewable energy for data centers",
        "Optimize cooling systems with AI-based controls",
        "Adopt remote work policies to reduce commute emissions",
    ],
    medium: [
        "Install smart building management systems",
        "Use LED lighting with motion sensors",
        "Encourage public transport usage",
        "Implement digital-first policies to reduce paper",
        "Optimize HVAC systems for energy efficiency",
    ],
    low: [
        "Continue monitoring emission trends",
        "Share best practices with industry peers",
        "Set more ambitious reduction targets",
        "Invest in carbon offset programs",
        "Regular energy audits every quarter",
    ],
};

static MANUFACTURING: SectorProfile = SectorProfile {
    name: "Manufacturing",
    demo: &[
        demo("Tata Steel", 80_000, 472_000.0),
        demo("JSW Steel", 60_000, 384_000.0),
        demo("Mahindra & Mahindra", 60_000, 312_000.0),
        demo("Larsen & Toubro", 70_000, 336_000.0),
        demo("Bharat Heavy Electricals", 50_000, 275_000.0),
    ],
    thresholds: thresholds(4.5, 5.5, 6.5, 7.5),
    high: [
        "Upgrade to energy-efficient machinery",
        "Install solar panels on factory roofs",
        "Implement waste heat recovery systems",
        "Switch to electric forklifts and vehicles",
        "Optimize production schedules to reduce energy peaks",
    ],
    medium: [
        "Regular maintenance to prevent energy waste",
        "Install variable frequency drives on motors",
        "Improve insulation in buildings",
        "Use natural lighting where possible",
        "Implement lean manufacturing principles",
    ],
    low: [
        "Continue current sustainability practices",
        "Monitor supply chain emissions",
        "Set science-based targets",
        "Invest in R&D for cleaner processes",
        "Regular benchmarking against industry leaders",
    ],
};

static ENERGY: SectorProfile = SectorProfile {
    name: "Energy",
    demo: &[
        demo("Adani Green Energy", 30_000, 96_000.0),
        demo("NTPC", 40_000, 164_000.0),
        demo("Power Grid Corporation", 30_000, 114_000.0),
        demo("Tata Power", 30_000, 108_000.0),
        demo("ReNew Power", 25_000, 72_500.0),
    ],
    thresholds: thresholds(3.0, 3.5, 4.0, 4.5),
    high: [
        "Accelerate renewable energy adoption",
        "Retire oldest coal-based facilities",
        "Invest in battery storage solutions",
        "Implement smart grid technologies",
        "Carbon capture and storage pilot programs",
    ],
    medium: [
        "Improve efficiency of existing plants",
        "Reduce transmission losses",
        "Adopt predictive maintenance",
        "Invest in hybrid renewable systems",
        "Employee training on energy conservation",
    ],
    low: [
        "Continue renewable expansion",
        "Share green technology with peers",
        "Set net-zero targets",
        "Invest in green hydrogen",
        "Regular sustainability reporting",
    ],
};

static HEALTHCARE: SectorProfile = SectorProfile {
    name: "Healthcare",
    demo: &[
        demo("Apollo Hospitals", 60_000, 204_000.0),
        demo("Fortis Healthcare", 40_000, 144_000.0),
        demo("Max Healthcare", 30_000, 105_000.0),
        demo("Dr. Reddy's Laboratories", 25_000, 95_000.0),
        demo("Cipla", 25_000, 82_500.0),
    ],
    thresholds: thresholds(3.0, 3.5, 4.0, 4.5),
    high: [
        "Switch to energy-efficient medical equipment",
        "Install solar panels on hospital buildings",
        "Optimize HVAC in operation theaters",
        "Use LED lighting throughout facilities",
        "Implement medical waste reduction programs",
    ],
    medium: [
        "Regular energy audits of facilities",
        "Train staff on energy conservation",
        "Use telemedicine to reduce patient travel",
        "Optimize laundry and sterilization processes",
        "Install motion sensors in low-traffic areas",
    ],
    low: [
        "Continue sustainable practices",
        "Benchmark against green hospitals",
        "Set ambitious reduction targets",
        "Invest in green building certifications",
        "Regular sustainability reporting",
    ],
};

static EDUCATION: SectorProfile = SectorProfile {
    name: "Education",
    demo: &[
        demo("BYJU's", 20_000, 36_000.0),
        demo("Unacademy", 15_000, 24_000.0),
        demo("upGrad", 10_000, 17_000.0),
        demo("Vedantu", 8_000, 12_000.0),
        demo("PhysicsWallah", 6_000, 8_400.0),
    ],
    thresholds: thresholds(1.5, 2.0, 2.5, 3.0),
    high: [
        "Switch to 100% renewable energy",
        "Install solar panels on campus buildings",
        "Implement campus-wide LED lighting",
        "Optimize online learning to reduce commute",
        "Use smart building management systems",
    ],
    medium: [
        "Encourage public transport for students",
        "Install bike racks and EV charging stations",
        "Reduce paper usage with digital systems",
        "Optimize heating and cooling schedules",
        "Regular energy audits",
    ],
    low: [
        "Continue green campus initiatives",
        "Set science-based targets",
        "Share best practices with other institutions",
        "Invest in sustainability research",
        "Regular carbon footprint assessments",
    ],
};

static ALL: [&SectorProfile; 5] = [&IT, &MANUFACTURING, &ENERGY, &HEALTHCARE, &EDUCATION];

/// The known sector matching `name` case-insensitively.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static SectorProfile> {
    let name = name.trim();
    ALL.iter().copied().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Reference data for `name`, IT data when the sector is unknown.
#[must_use]
pub fn profile_or_default(name: &str) -> &'static SectorProfile {
    lookup(name).unwrap_or(&IT)
}

/// Names of the sectors with reference data.
#[must_use]
pub fn known_sectors() -> Vec<&'static str> {
    ALL.iter().map(|p| p.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sector_has_five_demo_orgs() {
        for profile in ALL {
            assert_eq!(profile.demo.len(), 5, "{}", profile.name);
            assert!(profile.demo.iter().all(|d| d.employees > 0));
        }
    }

    #[test]
    fn thresholds_are_ordered() {
        for profile in ALL {
            let t = profile.thresholds;
            assert!(t.excellent < t.good && t.good < t.average && t.average < t.needs_improvement);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup("healthcare").map(|p| p.name), Some("Healthcare"));
        assert!(lookup("Retail").is_none());
        assert_eq!(profile_or_default("Retail").name, "IT");
    }

    #[test]
    fn practices_per_level() {
        let it = profile_or_default("IT");
        assert_eq!(it.practices(PracticeLevel::High).len(), 5);
        assert_eq!(
            it.practices(PracticeLevel::Low)[0],
            "Continue monitoring emission trends"
        );
    }
}

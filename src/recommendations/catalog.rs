use crate::recommendations::{Icon, Recommendation};
use crate::scenario::ScenarioId;

static DNA_CATALOG: [Recommendation; 3] = [
    Recommendation {
        title: "SMS Reminder System",
        impact: 85,
        effort: 30,
        description: "Implement automated SMS reminders 24-48 hours before appointments",
        category: "Technology",
        icon: Icon::Settings,
    },
    Recommendation {
        title: "Flexible Booking Platform",
        impact: 70,
        effort: 50,
        description: "Online booking system with easy rescheduling options",
        category: "Digital",
        icon: Icon::Zap,
    },
    Recommendation {
        title: "Patient Education Program",
        impact: 60,
        effort: 40,
        description: "Educational campaigns about appointment importance",
        category: "Education",
        icon: Icon::Users,
    },
];

static ASH_CATALOG: [Recommendation; 3] = [
    Recommendation {
        title: "Primary Care Integration",
        impact: 90,
        effort: 70,
        description: "Enhanced primary care access and follow-up systems",
        category: "Care Model",
        icon: Icon::Users,
    },
    Recommendation {
        title: "Chronic Disease Management",
        impact: 80,
        effort: 60,
        description: "Proactive monitoring and management programs",
        category: "Clinical",
        icon: Icon::Target,
    },
    Recommendation {
        title: "Community Health Hubs",
        impact: 75,
        effort: 80,
        description: "Local health centers for preventive care",
        category: "Infrastructure",
        icon: Icon::Settings,
    },
];

static NZEPS_CATALOG: [Recommendation; 3] = [
    Recommendation {
        title: "Provider Training Program",
        impact: 85,
        effort: 40,
        description: "Comprehensive e-prescription training for healthcare providers",
        category: "Training",
        icon: Icon::Users,
    },
    Recommendation {
        title: "System Integration",
        impact: 90,
        effort: 60,
        description: "Seamless integration with existing practice management systems",
        category: "Technology",
        icon: Icon::Zap,
    },
    Recommendation {
        title: "Patient Portal Development",
        impact: 70,
        effort: 50,
        description: "Patient-facing portal for prescription management",
        category: "Digital",
        icon: Icon::Settings,
    },
];

/// Unranked catalog in authoring order.
pub fn catalog(scenario: ScenarioId) -> &'static [Recommendation] {
    match scenario {
        ScenarioId::Dna => &DNA_CATALOG,
        ScenarioId::Ash => &ASH_CATALOG,
        ScenarioId::NzePs => &NZEPS_CATALOG,
    }
}

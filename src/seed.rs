// src/seed.rs

//! Sample catalog, accounts and eco actions for demos and local development.

use crate::{
    error::AppError,
    models::{
        eco_action::NewEcoAction,
        module::{Difficulty, ModuleType, NewModule, Question},
        user::{NewUser, Role},
    },
    store::Store,
    utils::{gamification::level_for_points, hash::hash_password},
};

/// Shared password of every demo account.
pub const DEMO_PASSWORD: &str = "password123";

const DEMO_STUDENT_EMAIL: &str = "alex@student.com";

fn question(text: &str, choices: [&str; 4], correct_answer_index: i32, explanation: &str) -> Question {
    Question {
        question_text: text.to_string(),
        choices: choices.iter().map(|c| c.to_string()).collect(),
        correct_answer_index,
        explanation: explanation.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn module(
    title: &str,
    description: &str,
    category: &str,
    difficulty: Difficulty,
    module_type: ModuleType,
    points: i64,
    estimated_time: &str,
    icon: &str,
    questions: Vec<Question>,
) -> NewModule {
    NewModule {
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        difficulty,
        module_type,
        points,
        estimated_time: estimated_time.to_string(),
        icon: icon.to_string(),
        questions,
    }
}

pub fn demo_catalog() -> Vec<NewModule> {
    vec![
        module(
            "Ocean Pollution Crisis",
            "Discover the impact of plastic waste on marine life and learn about solutions",
            "Marine Biology",
            Difficulty::Intermediate,
            ModuleType::Quiz,
            150,
            "25 min",
            "🌊",
            vec![
                question(
                    "What percentage of ocean plastic pollution comes from land-based sources?",
                    ["50%", "60%", "70%", "80%"],
                    3,
                    "Approximately 80% of ocean plastic pollution originates from land-based sources, including rivers, coastal activities, and improper waste management.",
                ),
                question(
                    "Which marine animal is most affected by plastic bag pollution?",
                    ["Dolphins", "Sea turtles", "Whales", "Fish"],
                    1,
                    "Sea turtles often mistake plastic bags for jellyfish, their primary food source, leading to ingestion and potential death.",
                ),
                question(
                    "How long does it take for a plastic bottle to decompose in the ocean?",
                    ["50 years", "100 years", "450 years", "1000 years"],
                    2,
                    "Plastic bottles can take up to 450 years to decompose in marine environments, causing long-term pollution.",
                ),
            ],
        ),
        module(
            "Renewable Energy Heroes",
            "Learn about solar, wind, and hydro power solutions for a sustainable future",
            "Energy",
            Difficulty::Beginner,
            ModuleType::Quiz,
            120,
            "20 min",
            "⚡",
            vec![
                question(
                    "Which renewable energy source is most widely used globally?",
                    ["Solar", "Wind", "Hydroelectric", "Geothermal"],
                    2,
                    "Hydroelectric power is currently the most widely used renewable energy source, accounting for about 16% of global electricity generation.",
                ),
                question(
                    "What is the main advantage of solar panels?",
                    ["Low cost", "No emissions", "Easy installation", "High efficiency"],
                    1,
                    "The main advantage of solar panels is that they produce electricity without any harmful emissions, making them environmentally friendly.",
                ),
            ],
        ),
        module(
            "Climate Change Detective",
            "Investigate the causes and effects of global warming through interactive scenarios",
            "Climate Science",
            Difficulty::Advanced,
            ModuleType::Challenge,
            200,
            "35 min",
            "🔍",
            vec![
                question(
                    "What is the primary greenhouse gas responsible for climate change?",
                    ["Methane", "Carbon dioxide", "Nitrous oxide", "Fluorinated gases"],
                    1,
                    "Carbon dioxide (CO2) is the primary greenhouse gas, accounting for about 76% of total greenhouse gas emissions.",
                ),
                question(
                    "Which sector contributes most to global CO2 emissions?",
                    ["Transportation", "Energy production", "Agriculture", "Industry"],
                    1,
                    "Energy production, including electricity and heat generation, is the largest source of CO2 emissions globally.",
                ),
            ],
        ),
        module(
            "Forest Conservation Quest",
            "Explore the importance of forests and learn about conservation strategies",
            "Conservation",
            Difficulty::Intermediate,
            ModuleType::EcoMission,
            180,
            "30 min",
            "🌳",
            vec![
                question(
                    "What percentage of the world's oxygen is produced by forests?",
                    ["10%", "20%", "28%", "35%"],
                    2,
                    "Forests produce approximately 28% of the world's oxygen, with the Amazon rainforest alone contributing about 20%.",
                ),
                question(
                    "Which is the most effective way to combat deforestation?",
                    [
                        "Planting new trees",
                        "Sustainable logging",
                        "Protecting existing forests",
                        "Using alternatives to wood",
                    ],
                    2,
                    "Protecting existing forests is the most effective approach as mature forests store more carbon and support more biodiversity than newly planted trees.",
                ),
            ],
        ),
    ]
}

/// Inserts the demo catalog if the store has no modules yet.
/// Returns how many modules were inserted.
pub async fn seed_demo_catalog(store: &dyn Store) -> Result<usize, AppError> {
    if store.count_modules().await? > 0 {
        tracing::info!("Module catalog already present, skipping seed.");
        return Ok(0);
    }

    let catalog = demo_catalog();
    let count = catalog.len();
    for new_module in catalog {
        store.create_module(new_module).await?;
    }

    tracing::info!("Seeded {} demo modules.", count);
    Ok(count)
}

struct DemoAccount {
    name: &'static str,
    email: &'static str,
    role: Role,
    points: i64,
    badges: &'static [&'static str],
    streak: i64,
    linked_to_parent: bool,
}

impl DemoAccount {
    fn to_new_user(&self, password_hash: &str, parent_id: Option<i64>) -> NewUser {
        NewUser {
            name: self.name.to_string(),
            email: self.email.to_string(),
            password_hash: password_hash.to_string(),
            role: self.role,
            points: self.points,
            level: level_for_points(self.points),
            badges: self.badges.iter().map(|b| b.to_string()).collect(),
            streak: self.streak,
            parent_id: if self.linked_to_parent { parent_id } else { None },
        }
    }
}

const DEMO_PARENT: DemoAccount = DemoAccount {
    name: "Sarah Wilson",
    email: "parent@family.com",
    role: Role::Parent,
    points: 0,
    badges: &[],
    streak: 0,
    linked_to_parent: false,
};

const DEMO_ACCOUNTS: [DemoAccount; 3] = [
    DemoAccount {
        name: "Alex Chen",
        email: DEMO_STUDENT_EMAIL,
        role: Role::Student,
        points: 2850,
        badges: &["Welcome", "Water Guardian", "Green Warrior", "Quiz Master"],
        streak: 7,
        linked_to_parent: true,
    },
    DemoAccount {
        name: "Emma Rodriguez",
        email: "emma@student.com",
        role: Role::Student,
        points: 2720,
        badges: &["Welcome", "Nature Explorer", "Eco Warrior"],
        streak: 5,
        linked_to_parent: true,
    },
    DemoAccount {
        name: "Ms. Johnson",
        email: "teacher@school.com",
        role: Role::Teacher,
        points: 0,
        badges: &[],
        streak: 0,
        linked_to_parent: false,
    },
];

/// `(title, description, impact, points, completed)` for Alex's actions.
const DEMO_ECO_ACTIONS: [(&str, &str, &str, i64, bool); 3] = [
    (
        "Use reusable water bottle",
        "Replace single-use plastic bottles with a reusable alternative",
        "Reduces plastic waste by 1,460 bottles per year",
        15,
        true,
    ),
    (
        "Take shorter showers",
        "Reduce shower time to conserve water",
        "Saves 25 gallons of water per week",
        10,
        true,
    ),
    (
        "Plant a tree (virtually)",
        "Participate in virtual tree planting initiative",
        "Contributes to reforestation efforts",
        25,
        false,
    ),
];

/// Inserts the demo parent, students and teacher, plus Alex's eco actions.
/// Skipped when the demo student already exists. Returns the accounts created.
pub async fn seed_demo_accounts(store: &dyn Store) -> Result<usize, AppError> {
    if store.find_user_by_email(DEMO_STUDENT_EMAIL).await?.is_some() {
        tracing::info!("Demo accounts already present, skipping seed.");
        return Ok(0);
    }

    let password_hash = hash_password(DEMO_PASSWORD)?;

    let parent = store
        .create_user(DEMO_PARENT.to_new_user(&password_hash, None))
        .await?;

    let mut student_id = None;
    for account in &DEMO_ACCOUNTS {
        let user = store
            .create_user(account.to_new_user(&password_hash, Some(parent.id)))
            .await?;
        if account.email == DEMO_STUDENT_EMAIL {
            student_id = Some(user.id);
        }
    }

    if let Some(user_id) = student_id {
        for (title, description, impact, points, completed) in DEMO_ECO_ACTIONS {
            let action = store
                .create_eco_action(NewEcoAction {
                    user_id,
                    title: title.to_string(),
                    description: description.to_string(),
                    impact: impact.to_string(),
                    points,
                })
                .await?;
            if completed {
                store.complete_eco_action(user_id, action.id).await?;
            }
        }
    }

    let count = DEMO_ACCOUNTS.len() + 1;
    tracing::info!("Seeded {} demo accounts.", count);
    Ok(count)
}

/// Seeds the module catalog and the demo accounts, each only once.
pub async fn seed_demo_data(store: &dyn Store) -> Result<(), AppError> {
    seed_demo_catalog(store).await?;
    seed_demo_accounts(store).await?;
    Ok(())
}

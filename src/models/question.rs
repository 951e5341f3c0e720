use serde::{Deserialize, Serialize};

/// 年龄组枚举
///
/// 问卷流程按年龄组分叉：5-10 岁走简易表单，11-17 岁走完整问卷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    /// 5-10 岁（小学）
    #[serde(rename = "5-10")]
    Young,
    /// 11-17 岁（初高中）
    #[serde(rename = "11-17")]
    Teen,
}

impl AgeGroup {
    /// 获取年龄段标签
    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Young => "5-10",
            AgeGroup::Teen => "11-17",
        }
    }

    /// 尝试从字符串解析年龄组（精确匹配）
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "5-10" => Some(AgeGroup::Young),
            "11-17" => Some(AgeGroup::Teen),
            _ => None,
        }
    }

    /// 分析提示词中的年龄上下文
    pub fn analysis_context(self) -> &'static str {
        match self {
            AgeGroup::Young => {
                "This is for a young student (5-10 years old). Use simple, encouraging language and suggest age-appropriate career interests that can grow with them."
            }
            AgeGroup::Teen => {
                "This is for an older student (11-17 years old). Provide more detailed analysis and realistic career suggestions."
            }
        }
    }

    /// 分析提示词中的职业示例列表
    pub fn profession_examples(self) -> &'static str {
        match self {
            AgeGroup::Young => {
                "Teacher, Doctor, Artist, Scientist, Engineer, Veterinarian, Chef, Firefighter"
            }
            AgeGroup::Teen => {
                "Software Developer, Data Scientist, Graphic Designer, Teacher, Doctor, Nurse, Environmental Scientist, Psychologist, Social Worker, Architect, Artist, Musician, Writer, Biologist, Chemist, Marketing Manager"
            }
        }
    }
}

impl Default for AgeGroup {
    /// 未提供年龄组时按 11-17 处理
    fn default() -> Self {
        AgeGroup::Teen
    }
}

/// 性别枚举（仅用于无照片时的生成提示）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// 单选题
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqQuestion {
    /// 题目ID（如 q1）
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// 题干
    pub question: String,
    /// 选项列表
    pub options: Vec<String>,
}

impl McqQuestion {
    pub fn new(id: &str, question: &str, options: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            question: question.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// 11-17 岁内置问卷（固定顺序，运行期不可变）
pub fn builtin_questions() -> Vec<McqQuestion> {
    vec![
        McqQuestion::new(
            "q1",
            "What activities do you enjoy the most in your free time?",
            &[
                "Exploring new technologies or space",
                "Creating art, music, or stories",
                "Solving puzzles or complex problems",
                "Helping others (people, animals, environment)",
            ],
        ),
        McqQuestion::new(
            "q2",
            "If you could learn one new skill, what would it be?",
            &[
                "Coding or data analysis",
                "A musical instrument or artistic technique",
                "A new language or a complex theory",
                "Public speaking or first aid",
            ],
        ),
        McqQuestion::new(
            "q3",
            "Which subject in school excites you the most, and why?",
            &[
                "Science/Math - for its logic and discoveries",
                "Arts/Humanities - for its creativity and stories",
                "History/Social Studies - for understanding society",
                "Physical Education/Health - for its focus on wellbeing",
            ],
        ),
        McqQuestion::new(
            "q4",
            "Do you prefer working alone or in a team?",
            &[
                "Alone - I focus better on my own.",
                "In a team - I thrive on collaboration.",
                "A mix of both.",
                "It depends on the task.",
            ],
        ),
        McqQuestion::new(
            "q5",
            "What do you think you are really good at?",
            &[
                "Analyzing complex situations",
                "Coming up with new ideas",
                "Organizing and planning",
                "Understanding and connecting with people",
            ],
        ),
        McqQuestion::new(
            "q6",
            "What is something you find challenging but want to improve?",
            &[
                "Public speaking",
                "Staying organized",
                "Asking for help",
                "Learning technical skills",
            ],
        ),
        McqQuestion::new(
            "q7",
            "How do you handle failure or mistakes?",
            &[
                "Analyze what went wrong and learn from it.",
                "Try again immediately with a different approach.",
                "Take a break to reflect before trying again.",
                "Seek advice from others.",
            ],
        ),
        McqQuestion::new(
            "q8",
            "Are you more creative or logical in your thinking?",
            &[
                "Mostly logical",
                "Mostly creative",
                "A balance of both",
                "It depends on the situation",
            ],
        ),
        McqQuestion::new(
            "q9",
            "Do you like following instructions or figuring things out on your own?",
            &[
                "I prefer clear instructions.",
                "I enjoy figuring things out myself.",
                "A combination of both is ideal.",
                "I like to experiment first, then check instructions.",
            ],
        ),
        McqQuestion::new(
            "q10",
            "When solving a problem, do you prefer experiments, discussions, or reading?",
            &[
                "Hands-on experiments",
                "Collaborative discussions",
                "In-depth reading and research",
                "A mix of all three",
            ],
        ),
        McqQuestion::new(
            "q11",
            "Would you rather write an essay, give a presentation, or build a project?",
            &[
                "Write an essay",
                "Give a presentation",
                "Build a project",
                "None of the above",
            ],
        ),
        McqQuestion::new(
            "q12",
            "How do you react when someone disagrees with you?",
            &[
                "Listen to their perspective and seek understanding.",
                "Explain my reasoning to persuade them.",
                "Feel frustrated but try to find a compromise.",
                "Agree to disagree and move on.",
            ],
        ),
        McqQuestion::new(
            "q13",
            "Do you like taking leadership roles in group activities?",
            &[
                "Yes, I enjoy leading and motivating others.",
                "Sometimes, if I feel passionate about the project.",
                "No, I prefer to be a contributor.",
                "I can lead if needed, but it's not my preference.",
            ],
        ),
        McqQuestion::new(
            "q14",
            "What kind of friends do you enjoy being around?",
            &[
                "People who are creative and inspiring.",
                "People who are intellectual and challenge me.",
                "People who are supportive and empathetic.",
                "People who are fun-loving and adventurous.",
            ],
        ),
        McqQuestion::new(
            "q15",
            "How do you handle stress or pressure?",
            &[
                "Focus on the task and work through it.",
                "Take short breaks to relax and refocus.",
                "Talk to friends or family for support.",
                "Exercise or engage in a hobby to clear my mind.",
            ],
        ),
        McqQuestion::new(
            "q16",
            "What profession do you admire the most, and why?",
            &[
                "Scientists/Engineers - for their innovation.",
                "Artists/Writers - for their creativity.",
                "Doctors/Nurses - for their compassion.",
                "Entrepreneurs/Leaders - for their vision.",
            ],
        ),
        McqQuestion::new(
            "q17",
            "If you could invent something, what would it be?",
            &[
                "A tool to solve a major environmental problem.",
                "A new form of art or entertainment.",
                "A technology that advances human knowledge.",
                "A service that helps people in need.",
            ],
        ),
        McqQuestion::new(
            "q18",
            "Do you see yourself working in an office, lab, outdoors, or from home?",
            &[
                "A modern office or co-working space.",
                "A scientific lab or workshop.",
                "Outdoors in nature.",
                "From home with a flexible schedule.",
            ],
        ),
        McqQuestion::new(
            "q19",
            "Would you prefer a job with stability or one with adventure and change?",
            &[
                "A stable and secure job.",
                "A dynamic job with constant new challenges.",
                "A balance of both.",
                "I'm not sure yet.",
            ],
        ),
        McqQuestion::new(
            "q20",
            "Do you enjoy working with computers, robots, or AI tools?",
            &[
                "Yes, I find it fascinating.",
                "I enjoy it, but I'm still learning.",
                "Not particularly, I prefer other activities.",
                "I am neutral about it.",
            ],
        ),
        McqQuestion::new(
            "q21",
            "Would you like to create apps, design games, or build machines?",
            &[
                "Create mobile or web apps.",
                "Design video games or virtual worlds.",
                "Build robots or machines.",
                "I'm more interested in using them than building them.",
            ],
        ),
        McqQuestion::new(
            "q22",
            "How comfortable are you with learning new technology?",
            &[
                "Very comfortable, I pick it up quickly.",
                "Somewhat comfortable, I need some time to learn.",
                "Not very comfortable, it can be frustrating.",
                "It depends on the technology.",
            ],
        ),
        McqQuestion::new(
            "q23",
            "Is earning money, helping others, or creativity more important to you?",
            &[
                "Financial security is my top priority.",
                "Helping others or society is most important.",
                "Creative expression and passion are key.",
                "A balance of all three is ideal.",
            ],
        ),
        McqQuestion::new(
            "q24",
            "What kind of impact do you want to make in the world?",
            &[
                "Create something innovative that changes an industry.",
                "Inspire people through art or ideas.",
                "Help solve a major social or environmental problem.",
                "Make a positive difference in my local community.",
            ],
        ),
        McqQuestion::new(
            "q25",
            "Would you rather have a high-paying job or one that makes you happy?",
            &[
                "A high-paying job, even if it's not my passion.",
                "A job I love, even if the pay is lower.",
                "I want to find a job that is both high-paying and fulfilling.",
                "I'm not sure what would make me happiest yet.",
            ],
        ),
    ]
}

/// 题目生成失败时的兜底问卷
pub fn default_generated_questions() -> Vec<McqQuestion> {
    vec![
        McqQuestion::new(
            "",
            "What type of activities do you find most engaging?",
            &[
                "Working with technology",
                "Creating art or designs",
                "Helping people",
                "Analyzing data",
                "Leading teams",
            ],
        ),
        McqQuestion::new(
            "",
            "How do you prefer to learn new skills?",
            &[
                "Hands-on practice",
                "Reading and research",
                "Group discussions",
                "Online courses",
                "Mentorship",
            ],
        ),
        McqQuestion::new(
            "",
            "What motivates you most in work?",
            &[
                "Making a difference",
                "Financial success",
                "Creative expression",
                "Recognition",
                "Personal growth",
            ],
        ),
        McqQuestion::new(
            "",
            "How do you handle challenges?",
            &[
                "Face them head-on",
                "Plan carefully first",
                "Seek help from others",
                "Break them into steps",
                "Find creative solutions",
            ],
        ),
        McqQuestion::new(
            "",
            "What work environment suits you best?",
            &[
                "Office setting",
                "Outdoor locations",
                "Home/remote",
                "Laboratory",
                "Community spaces",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_group_labels() {
        assert_eq!(AgeGroup::Young.label(), "5-10");
        assert_eq!(AgeGroup::Teen.label(), "11-17");
        assert_eq!(AgeGroup::from_label("5-10"), Some(AgeGroup::Young));
        assert_eq!(AgeGroup::from_label("18+"), None);
        // 缺省按 11-17 处理
        assert_eq!(AgeGroup::default(), AgeGroup::Teen);
    }

    #[test]
    fn test_age_group_serde() {
        let json = serde_json::to_string(&AgeGroup::Young).unwrap();
        assert_eq!(json, r#""5-10""#);
        let parsed: AgeGroup = serde_json::from_str(r#""11-17""#).unwrap();
        assert_eq!(parsed, AgeGroup::Teen);
    }

    #[test]
    fn test_builtin_questions_shape() {
        let questions = builtin_questions();
        assert_eq!(questions.len(), 25);
        for (i, q) in questions.iter().enumerate() {
            assert_eq!(q.id, format!("q{}", i + 1));
            assert!(!q.question.is_empty());
            assert!(q.options.len() >= 4, "题目 {} 选项不足", q.id);
        }
    }

    #[test]
    fn test_default_generated_questions_shape() {
        let questions = default_generated_questions();
        assert_eq!(questions.len(), 5);
        assert!(questions.iter().all(|q| q.options.len() == 5));
    }
}

use serde::{Deserialize, Serialize};

/// 试卷分类（由所在文件夹决定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Category {
    #[serde(rename = "administrativo")]
    Administrativo,
    #[serde(rename = "contratos")]
    Contratos,
    #[serde(rename = "financiero")]
    Financiero,
    #[serde(rename = "politicas")]
    Politicas,
    #[serde(rename = "union-europea")]
    UnionEuropea,
    #[serde(rename = "repaso")]
    Repaso,
    #[default]
    #[serde(rename = "general")]
    General,
}

impl Category {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Category::Administrativo => "administrativo",
            Category::Contratos => "contratos",
            Category::Financiero => "financiero",
            Category::Politicas => "politicas",
            Category::UnionEuropea => "union-europea",
            Category::Repaso => "repaso",
            Category::General => "general",
        }
    }

    /// 按文件夹名判断分类（子串匹配，顺序固定）
    pub fn from_folder_name(folder: &str) -> Self {
        let folder = folder.to_lowercase();
        if folder.contains("administrativo") {
            Category::Administrativo
        } else if folder.contains("contratos") {
            Category::Contratos
        } else if folder.contains("financiero") {
            Category::Financiero
        } else if folder.contains("politica") {
            Category::Politicas
        } else if folder.contains("ue") {
            Category::UnionEuropea
        } else if folder.contains("repaso") {
            Category::Repaso
        } else {
            Category::General
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 科目（题库中的 materia）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SubjectArea {
    /// 宪法
    #[default]
    CeConstitucion,
    /// 行政组织
    OrgAdministrativa,
    /// 公职人员
    FuncionPublica,
    /// 行政程序
    ProcAdministrativo,
    /// 办公软件
    Ofimatica,
    /// 公共合同
    ContratosPublicos,
    /// 财务管理
    GestionFinanciera,
    /// 欧盟
    UnionEuropea,
}

impl SubjectArea {
    pub fn code(self) -> &'static str {
        match self {
            SubjectArea::CeConstitucion => "ce-constitucion",
            SubjectArea::OrgAdministrativa => "org-administrativa",
            SubjectArea::FuncionPublica => "funcion-publica",
            SubjectArea::ProcAdministrativo => "proc-administrativo",
            SubjectArea::Ofimatica => "ofimatica",
            SubjectArea::ContratosPublicos => "contratos-publicos",
            SubjectArea::GestionFinanciera => "gestion-financiera",
            SubjectArea::UnionEuropea => "union-europea",
        }
    }

    /// 根据主题编号和分类确定科目
    ///
    /// 分类优先；其余按主题编号区间划分
    pub fn for_topic(topic: u32, category: Category) -> Self {
        match category {
            Category::Contratos => SubjectArea::ContratosPublicos,
            Category::Financiero => SubjectArea::GestionFinanciera,
            Category::UnionEuropea => SubjectArea::UnionEuropea,
            Category::Administrativo => SubjectArea::ProcAdministrativo,
            Category::Politicas | Category::Repaso | Category::General => match topic {
                0..=5 => SubjectArea::CeConstitucion,
                6..=10 => SubjectArea::OrgAdministrativa,
                11..=13 => SubjectArea::FuncionPublica,
                14..=18 => SubjectArea::ProcAdministrativo,
                _ => SubjectArea::Ofimatica,
            },
        }
    }
}

impl std::fmt::Display for SubjectArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

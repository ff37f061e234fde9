//! 宪法基础数据
//!
//! 编译期生成的静态表，供解析说明和人工复核时引用

use phf::phf_map;

pub static CE_FACTS: phf::Map<&'static str, &'static str> = phf_map! {
    // 日期
    "entrada_vigor_ce" => "29 de diciembre de 1978",
    "referendum_ce" => "6 de diciembre de 1978",
    "sancion_ce" => "27 de diciembre de 1978",
    "primeras_elecciones_democraticas" => "1977",
    // 结构
    "forma_politica" => "Monarquía Parlamentaria",
    "estructura_ce" => "Preámbulo, 169 artículos, 4 disposiciones adicionales, 9 transitorias, 1 derogatoria, 1 final",
    "titulo_preliminar" => "Artículos 1-9",
    "titulo_i" => "De los derechos y deberes fundamentales (Art. 10-55)",
    "titulo_ii" => "De la Corona (Art. 56-65)",
    "titulo_iii" => "De las Cortes Generales (Art. 66-96)",
    "titulo_iv" => "Del Gobierno y la Administración (Art. 97-107)",
    "titulo_v" => "Relaciones Gobierno y Cortes (Art. 108-116)",
    "titulo_vi" => "Del Poder Judicial (Art. 117-127)",
    "titulo_vii" => "Economía y Hacienda (Art. 128-136)",
    "titulo_viii" => "Organización Territorial del Estado (Art. 137-158)",
    "titulo_ix" => "Del Tribunal Constitucional (Art. 159-165)",
    "titulo_x" => "De la Reforma Constitucional (Art. 166-169)",
    "soberania" => "pueblo español",
    // 王室
    "rey_actual" => "Felipe VI",
    "mayoria_edad_rey" => "18 años",
    // 基本权利
    "derecho_vida" => "Art. 15 CE",
    "libertad_ideologica" => "Art. 16 CE",
    "libertad_personal" => "Art. 17 CE",
    "derecho_honor" => "Art. 18 CE",
    "libertad_expresion" => "Art. 20 CE",
    "derecho_reunion" => "Art. 21 CE",
    "derecho_asociacion" => "Art. 22 CE",
    "tutela_judicial" => "Art. 24 CE",
    "derecho_educacion" => "Art. 27 CE",
    // 机构
    "defensor_pueblo_articulo" => "Art. 54 CE",
    "defensor_pueblo_mandato" => "5 años",
    "tc_composicion" => "12 magistrados",
    "tc_mandato" => "9 años",
    "tc_presidente_mandato" => "3 años",
    "tc_propuesta" => "4 Congreso, 4 Senado, 2 Gobierno, 2 CGPJ",
    "congreso_diputados" => "300-400 diputados",
    "iniciativa_legislativa_popular" => "500.000 firmas",
    // 修宪
    "reforma_ordinaria" => "Art. 167 CE - 3/5 ambas Cámaras",
    "reforma_agravada" => "Art. 168 CE - 2/3, disolución, nuevas Cortes, 2/3, referéndum",
};

/// 查询一条基础数据
pub fn fact(key: &str) -> Option<&'static str> {
    CE_FACTS.get(key).copied()
}

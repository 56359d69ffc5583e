//! 门户选择器表
//!
//! 门户改版时只需要改这里（或配置文件的 `[selectors]` 段）。
//! 默认值对应 Mecklenburg County Polaris 3G。

use serde::Deserialize;

use crate::infrastructure::Locator;

/// 门户页面上用到的全部选择器
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortalSelectors {
    /// 免责声明弹窗的关闭按钮（XPath）
    pub disclaimer_close: String,
    /// 地址搜索框（CSS）
    pub search_input: String,
    /// 搜索联想结果条目（CSS）
    pub search_result_item: String,
    /// "Property Info" 标签页按钮（XPath）
    pub info_tab: String,
    /// 字段值的 XPath 模板，`{label}` 会被替换为字段标签
    pub field_value_template: String,
    /// 地图工具按钮（CSS）
    pub map_tools_button: String,
    /// 读取地图中心的脚本，需返回 `{ lat, lng }`
    pub map_center_script: String,
    /// 缓冲区工具按钮（CSS）
    pub buffer_button: String,
    /// 缓冲距离输入框（CSS）
    pub buffer_distance_input: String,
    /// 缓冲单位下拉框（CSS）
    pub buffer_unit_select: String,
    /// 单位选项的显示文本
    pub buffer_unit_option: String,
    /// 应用缓冲区按钮（CSS）
    pub buffer_apply_button: String,
    /// 缓冲区结果面板（CSS）
    pub buffer_results_panel: String,
    /// 结果面板中每一项的地址（CSS）
    pub buffer_result_address: String,
}

impl Default for PortalSelectors {
    fn default() -> Self {
        Self {
            disclaimer_close: "//div[text()='Disclaimer']/..//button".to_string(),
            search_input: "input[placeholder*='Enter address / parcel#']".to_string(),
            search_result_item: ".search-result-item".to_string(),
            info_tab: "//button[contains(text(), 'Property Info')]".to_string(),
            field_value_template: "//div[contains(text(), '{label}')]/following-sibling::div"
                .to_string(),
            map_tools_button: "button[title='Map Tools']".to_string(),
            map_center_script: r#"
            (() => {
                const center = window.map.getCenter();
                const read = v => (typeof v === 'function' ? v.call(center) : v);
                return { lat: read(center.lat), lng: read(center.lng) };
            })()
            "#
            .to_string(),
            buffer_button: "button[title='Buffer']".to_string(),
            buffer_distance_input: "input[type='number']".to_string(),
            buffer_unit_select: "select".to_string(),
            buffer_unit_option: "Miles".to_string(),
            buffer_apply_button: "button[title='Apply Buffer']".to_string(),
            buffer_results_panel: ".search-results".to_string(),
            buffer_result_address: ".search-results .result-item .address".to_string(),
        }
    }
}

impl PortalSelectors {
    pub fn disclaimer_close(&self) -> Locator {
        Locator::xpath(&self.disclaimer_close)
    }

    pub fn search_input(&self) -> Locator {
        Locator::css(&self.search_input)
    }

    pub fn search_result_item(&self) -> Locator {
        Locator::css(&self.search_result_item)
    }

    pub fn info_tab(&self) -> Locator {
        Locator::xpath(&self.info_tab)
    }

    /// 某个字段标签旁边的值节点
    pub fn field_value(&self, label: &str) -> Locator {
        Locator::xpath(self.field_value_template.replace("{label}", label))
    }

    pub fn map_tools_button(&self) -> Locator {
        Locator::css(&self.map_tools_button)
    }

    pub fn buffer_button(&self) -> Locator {
        Locator::css(&self.buffer_button)
    }

    pub fn buffer_distance_input(&self) -> Locator {
        Locator::css(&self.buffer_distance_input)
    }

    pub fn buffer_unit_select(&self) -> Locator {
        Locator::css(&self.buffer_unit_select)
    }

    pub fn buffer_apply_button(&self) -> Locator {
        Locator::css(&self.buffer_apply_button)
    }

    pub fn buffer_results_panel(&self) -> Locator {
        Locator::css(&self.buffer_results_panel)
    }

    pub fn buffer_result_address(&self) -> Locator {
        Locator::css(&self.buffer_result_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_template() {
        let selectors = PortalSelectors::default();
        assert_eq!(
            selectors.field_value("Parcel ID"),
            Locator::xpath("//div[contains(text(), 'Parcel ID')]/following-sibling::div")
        );
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let selectors: PortalSelectors =
            toml::from_str(r##"search_input = "#search""##).unwrap();
        assert_eq!(selectors.search_input(), Locator::css("#search"));
        assert_eq!(selectors.buffer_unit_option, "Miles");
    }
}

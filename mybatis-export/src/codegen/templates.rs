//! Built-in templates, override loading and the template scaffold

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::materializer::ArtifactRole;
use crate::config::ExportConfig;
use crate::error::{CodegenError, Result};

/// Entity class
pub const ENTITY_TEMPLATE: &str = r#"package {{ package_path }}.{{ entity_package }};

import java.io.Serializable;

/**
 * {{ table_note }}
 */
public class {{ table_name_hump }} implements Serializable {
{% for f in fields %}

    // {{ f.comment }}
    private {{ f.java_type }} {{ f.property }};
{% endfor %}
{% for f in fields %}

    public void set{{ f.property_n }}({{ f.java_type }} {{ f.property }}) {
        this.{{ f.property }} = {{ f.property }};
    }

    public {{ f.java_type }} {% if f.java_type == "Boolean" %}is{% else %}get{% endif %}{{ f.property_n }}() {
        return this.{{ f.property }};
    }
{% endfor %}
}
"#;

/// Query object carrying the indexed columns as filters
pub const QUERY_TEMPLATE: &str = r#"package {{ package_path }}.{{ query_package }};

import {{ package_path }}.{{ query_root_package }}.Query;

import java.util.HashMap;
import java.util.HashSet;
import java.util.Map;
import java.util.Set;

public class {{ table_name_hump }}Query extends Query {
{% for f in fields if f.is_index %}

    // {{ f.comment }}
    private {{ f.java_type }} {{ f.property }};
{% endfor %}

    @Override
    protected Map<String, String> initAllowSortBy() {
        HashMap<String, String> allowSortBy = new HashMap<>();
{% if pk %}
        allowSortBy.put("{{ pk }}", "{{ pk }}");
{% endif %}
        return allowSortBy;
    }

    @Override
    protected Set<String> initQueryFields() {
        HashSet<String> fieldSet = new HashSet<>();
{% for f in fields %}
        fieldSet.add("{{ f.field }}");
{% endfor %}
        return fieldSet;
    }
{% for f in fields if f.is_index %}

    public void set{{ f.property_n }}({{ f.java_type }} {{ f.property }}) {
        this.{{ f.property }} = {{ f.property }};
    }

    public {{ f.java_type }} {% if f.java_type == "Boolean" %}is{% else %}get{% endif %}{{ f.property_n }}() {
        return this.{{ f.property }};
    }
{% endfor %}
}
"#;

/// Data-access mapper interface
pub const MAPPER_TEMPLATE: &str = r#"package {{ package_path }}.{{ mapper_package }};

import {{ package_path }}.{{ entity_package }}.{{ table_name_hump }};
import {{ package_path }}.{{ query_package }}.{{ table_name_hump }}Query;
import org.apache.ibatis.annotations.Mapper;
import org.apache.ibatis.annotations.Param;

import java.util.List;

@Mapper
public interface {{ table_name_hump }}Mapper {

    Integer count({{ table_name_hump }}Query query);

    List<{{ table_name_hump }}> list({{ table_name_hump }}Query query);

    Integer insert({{ table_name_hump }} entity);
{% if pk %}

    Integer update({{ table_name_hump }} entity);

    Integer delete(@Param("{{ pk_hump }}") {{ pk_type }} {{ pk_hump }});
{% endif %}
}
"#;

/// MyBatis mapping descriptor
pub const MAPPER_XML_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- {{ table_note }} -->
<!DOCTYPE mapper
        PUBLIC "-//mybatis.org//DTD Mapper 3.0//EN"
        "http://mybatis.org/dtd/mybatis-3-mapper.dtd">

<mapper namespace="{{ package_path }}.{{ mapper_package }}.{{ table_name_hump }}Mapper">
    <resultMap id="{{ table_name_hump }}" type="{{ package_path }}.{{ entity_package }}.{{ table_name_hump }}">
{% for f in fields %}
{% if f.is_pk %}
        <id column="{{ f.field }}" property="{{ f.property }}"{% if f.jdbc_type %} jdbcType="{{ f.jdbc_type }}"{% endif %} />
{% else %}
        <result column="{{ f.field }}" property="{{ f.property }}"{% if f.jdbc_type %} jdbcType="{{ f.jdbc_type }}"{% endif %} />
{% endif %}
{% endfor %}
    </resultMap>

    <sql id="conditions">
        <where>
{% for f in fields if f.is_index %}
            <if test="{{ f.property }} != null">
                and `{{ f.field }}` = #{ {{ f.property }}{% if f.jdbc_type %}, jdbcType={{ f.jdbc_type }}{% endif %} }
            </if>
{% endfor %}
        </where>
    </sql>

    <select id="list" resultMap="{{ table_name_hump }}">
        select
        <choose>
            <when test="null != queryFields">
                <foreach collection="queryFields" separator="," item="field">
                    `${field}`
                </foreach>
            </when>
            <otherwise>
                *
            </otherwise>
        </choose>
        from {{ table_name }}
        <include refid="conditions" />
        order by
        <choose>
            <when test="sortBy != null">
                ${sortBy}
            </when>
            <otherwise>
                {% if pk %}`{{ pk }}`{% else %}1{% endif %}

            </otherwise>
        </choose>
        <choose>
            <when test="sortOrder != null">
                ${sortOrder}
            </when>
            <otherwise>
                desc
            </otherwise>
        </choose>
        limit #{offset}, #{length}
    </select>

    <select id="count" resultType="java.lang.Integer">
        select count(*) as cnt from {{ table_name }}
        <include refid="conditions" />
    </select>

    <insert id="insert" parameterType="{{ package_path }}.{{ entity_package }}.{{ table_name_hump }}"{% if pk %} keyProperty="{{ pk_hump }}" useGeneratedKeys="true"{% endif %}>
        insert into {{ table_name }}
        <trim prefix="(" suffix=")" suffixOverrides=",">
{% for f in fields %}
            <if test="{{ f.property }} != null">
                `{{ f.field }}`,
            </if>
{% endfor %}
        </trim>
        <trim prefix="values(" suffix=")" suffixOverrides=",">
{% for f in fields %}
            <if test="{{ f.property }} != null">
                #{ {{ f.property }}{% if f.jdbc_type %}, jdbcType={{ f.jdbc_type }}{% endif %} },
            </if>
{% endfor %}
        </trim>
    </insert>
{% if pk %}

    <update id="update" parameterType="{{ package_path }}.{{ entity_package }}.{{ table_name_hump }}">
        update {{ table_name }}
        <set>
{% for f in fields if not f.is_pk %}
            <if test="{{ f.property }} != null">
                `{{ f.field }}` = #{ {{ f.property }}{% if f.jdbc_type %}, jdbcType={{ f.jdbc_type }}{% endif %} },
            </if>
{% endfor %}
        </set>
        where `{{ pk }}` = #{ {{ pk_hump }} }
    </update>

    <delete id="delete">
        delete from {{ table_name }} where `{{ pk }}` = #{ {{ pk_hump }} }
    </delete>
{% endif %}
</mapper>
"#;

/// Abstract base class every generated query object extends
pub const BASE_QUERY_TEMPLATE: &str = r#"package {{ package_path }}.{{ query_root_package }};

import java.io.Serializable;
import java.util.Map;
import java.util.Set;

public abstract class Query<T> implements Serializable {
    private String sortBy;
    private String sortOrder;
    private Integer page;
    private Integer pageCnt;

    private T data;

    private Map<String, String> allowSortBy;
    private Set<String> queryFields;

    public Query() {
        this.page = 1;
        this.pageCnt = 20;
        this.allowSortBy = initAllowSortBy();
        this.queryFields = initQueryFields();
    }

    public String getSortBy() {
        return sortBy;
    }

    public void setSortBy(String sortBy) {
        if (null == allowSortBy || !allowSortBy.containsKey(sortBy)) {
            return;
        }
        this.sortBy = allowSortBy.get(sortBy);
    }

    public String getSortOrder() {
        return sortOrder;
    }

    public void setSortOrder(SortOrder sortOrder) {
        this.sortOrder = null == sortOrder ? "DESC" : sortOrder.toString();
    }

    public Integer getPage() {
        if (null != this.page && this.page > 0) {
            return this.page;
        }
        return 1;
    }

    public void setPage(Integer page) {
        this.page = page;
    }

    public void nextPage() {
        this.page++;
    }

    public void prevPage() {
        this.page--;
    }

    public Integer getPageCnt() {
        return getLength();
    }

    public void setPageCnt(Integer pageCnt) {
        this.pageCnt = pageCnt;
    }

    public Integer getOffset() {
        return (getPage() - 1) * getLength();
    }

    public Integer getLength() {
        if (null == this.pageCnt || this.pageCnt <= 0) {
            return 20;
        }
        return this.pageCnt;
    }

    protected abstract Map<String, String> initAllowSortBy();

    protected abstract Set<String> initQueryFields();

    public Map<String, String> getAllowSortBy() {
        return allowSortBy;
    }

    public void setAllowSortBy(Map<String, String> allowSortBy) {
        this.allowSortBy = allowSortBy;
    }

    public Set<String> getQueryFields() {
        return queryFields;
    }

    public void setQueryFields(Set<String> queryFields) {
        this.queryFields = queryFields;
    }

    public Set<String> addQueryField(String field) {
        queryFields.add(field);
        return queryFields;
    }

    public Set<String> removeQueryField(String field) {
        queryFields.remove(field);
        return queryFields;
    }

    public T getData() {
        return data;
    }

    public void setData(T data) {
        this.data = data;
    }

    public enum SortOrder {
        ASC,
        DESC
    }
}
"#;

/// Sample configuration written by the scaffold
pub const SAMPLE_CONFIG: &str = r#"# mybatis-export configuration
host: localhost
port: 3306
user: root
password: ""
database: ""
# tables to export; leave empty to be asked
tables: []
table-prefix: []
# relative paths are resolved against this file's directory
root-path: ./export
root-package: com.example
entity-package: entity
mapper-package: mapper
mapper-xml-path: mapper
query-package: model.query
entity-template: template/entity.j2
mapper-template: template/mapper.j2
mapper-xml-template: template/mapper_xml.j2
query-template: template/query.j2
overwrite: false
"#;

/// The template text used for each artifact role in one run
#[derive(Debug, Clone)]
pub struct TemplateSet {
    entity: String,
    query: String,
    mapper: String,
    mapper_xml: String,
    base_query: String,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateSet {
    /// Built-in templates only
    pub fn builtin() -> Self {
        Self {
            entity: ENTITY_TEMPLATE.to_string(),
            query: QUERY_TEMPLATE.to_string(),
            mapper: MAPPER_TEMPLATE.to_string(),
            mapper_xml: MAPPER_XML_TEMPLATE.to_string(),
            base_query: BASE_QUERY_TEMPLATE.to_string(),
        }
    }

    /// Built-in templates with configured overrides applied.
    ///
    /// An override that cannot be read falls back to the built-in text.
    pub fn load(config: &ExportConfig) -> Self {
        Self {
            entity: load_override(config.entity_template.as_deref(), "entity", ENTITY_TEMPLATE),
            query: load_override(config.query_template.as_deref(), "query", QUERY_TEMPLATE),
            mapper: load_override(config.mapper_template.as_deref(), "mapper", MAPPER_TEMPLATE),
            mapper_xml: load_override(
                config.mapper_xml_template.as_deref(),
                "mapper xml",
                MAPPER_XML_TEMPLATE,
            ),
            base_query: BASE_QUERY_TEMPLATE.to_string(),
        }
    }

    /// Replace the template for one role
    pub fn with_template(mut self, role: ArtifactRole, source: impl Into<String>) -> Self {
        let source = source.into();
        match role {
            ArtifactRole::Entity => self.entity = source,
            ArtifactRole::Query => self.query = source,
            ArtifactRole::Mapper => self.mapper = source,
            ArtifactRole::MapperXml => self.mapper_xml = source,
            ArtifactRole::BaseQuery => self.base_query = source,
        }
        self
    }

    pub fn get(&self, role: ArtifactRole) -> &str {
        match role {
            ArtifactRole::Entity => &self.entity,
            ArtifactRole::Query => &self.query,
            ArtifactRole::Mapper => &self.mapper,
            ArtifactRole::MapperXml => &self.mapper_xml,
            ArtifactRole::BaseQuery => &self.base_query,
        }
    }
}

fn load_override(path: Option<&Path>, what: &str, builtin: &str) -> String {
    let Some(path) = path else {
        return builtin.to_string();
    };
    match fs::read_to_string(path) {
        Ok(source) => {
            debug!("Using {} template {}", what, path.display());
            source
        }
        Err(e) => {
            warn!(
                "Read {} template {} failed: {}, using default",
                what,
                path.display(),
                e
            );
            builtin.to_string()
        }
    }
}

/// Write the built-in templates and a sample config into `dir`.
///
/// Returns the path of the written config file.
pub fn write_scaffold(dir: &Path) -> Result<PathBuf> {
    let template_dir = dir.join("template");
    for path in [dir, template_dir.as_path()] {
        if path.exists() && !path.is_dir() {
            return Err(CodegenError::Validation(format!(
                "The path [{}] is not a directory",
                path.display()
            )));
        }
    }
    fs::create_dir_all(&template_dir).map_err(|source| CodegenError::DirectoryCreate {
        path: template_dir.clone(),
        source,
    })?;

    let files = [
        (template_dir.join("entity.j2"), ENTITY_TEMPLATE),
        (template_dir.join("mapper.j2"), MAPPER_TEMPLATE),
        (template_dir.join("mapper_xml.j2"), MAPPER_XML_TEMPLATE),
        (template_dir.join("query.j2"), QUERY_TEMPLATE),
        (dir.join("config.yaml"), SAMPLE_CONFIG),
    ];
    for (path, content) in &files {
        fs::write(path, content).map_err(|source| CodegenError::FileWrite {
            path: path.clone(),
            source,
        })?;
        debug!("Wrote {}", path.display());
    }

    Ok(dir.join("config.yaml"))
}

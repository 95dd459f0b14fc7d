use tracing::debug;

use super::{
    catalog::{ClassMap, TypeCatalog},
    comment,
    contract::{ComplexType, Contract, Field, Operation, Parameter, ReturnInfo},
    error::Error,
    reflect::{ClassLoader, ServiceClass},
};

/// Builds a [`Contract`] from a handler's self-description.
#[derive(Debug, Clone)]
pub struct Discoverer {
    location: String,
    namespace: Option<String>,
    class_path: Vec<String>,
    class_map: ClassMap,
}

impl Discoverer {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            namespace: None,
            class_path: Vec::new(),
            class_map: ClassMap::new(),
        }
    }

    /// Target namespace of the generated document. Defaults to the location.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn class_path(mut self, paths: Vec<String>) -> Self {
        self.class_path = paths;
        self
    }

    pub fn add_class_path(mut self, path: impl Into<String>) -> Self {
        self.class_path.push(path.into());
        self
    }

    pub fn class_map(mut self, map: ClassMap) -> Self {
        self.class_map = map;
        self
    }

    pub fn discover(
        &self,
        class: &ServiceClass,
        loader: &dyn ClassLoader,
    ) -> Result<Contract, Error> {
        let namespace = self
            .namespace
            .clone()
            .unwrap_or_else(|| self.location.clone());

        let mut catalog = TypeCatalog::new(namespace.clone());
        catalog.set_class_path(self.class_path.clone());
        catalog.set_class_map(self.class_map.clone());

        let mut referenced = Vec::new();
        let mut operations = Vec::new();

        for method in class.methods.iter().filter(|method| method.is_operation()) {
            let operation = discover_operation(&method.name, method.doc.as_deref());

            for type_name in operation
                .input
                .iter()
                .map(|param| &param.type_name)
                .chain(operation.output.iter().map(|output| &output.type_name))
            {
                if !referenced.contains(type_name) {
                    referenced.push(type_name.clone());
                }
            }

            debug!(
                operation = %operation.name,
                params = operation.input.len(),
                void = operation.is_void(),
                "discovered operation"
            );

            operations.push(operation);
        }

        for type_name in &referenced {
            if !catalog.contains(type_name) {
                add_complex_type(&mut catalog, type_name, loader)?;
            }
        }

        let documentation = class
            .doc
            .as_deref()
            .map(comment::summary)
            .filter(|summary| !summary.is_empty());

        Ok(Contract {
            class_name: class.name.clone(),
            service_name: class.short_name().to_owned(),
            documentation,
            namespace,
            location: self.location.clone(),
            operations,
            catalog,
        })
    }
}

fn discover_operation(name: &str, doc: Option<&str>) -> Operation {
    let mut operation = Operation::new(name);
    let doc = match doc {
        Some(doc) => doc,
        None => return operation,
    };

    operation.input = comment::params(doc)
        .into_iter()
        .map(|param| Parameter {
            name: param.name,
            type_name: param.type_name,
            repeated: param.repeated,
            docs: param.docs,
        })
        .collect();

    operation.output = comment::return_type(doc)
        .filter(|ret| ret.type_name != "void")
        .map(|ret| ReturnInfo {
            type_name: ret.type_name,
            repeated: ret.repeated,
            docs: ret.docs,
        });

    operation.documentation = comment::summary(doc);
    operation.doc_comment = Some(doc.to_owned());
    operation
}

fn add_complex_type(
    catalog: &mut TypeCatalog,
    referenced: &str,
    loader: &dyn ClassLoader,
) -> Result<(), Error> {
    let class = catalog.lookup_class(referenced, loader)?;

    if catalog.has_complex_type(&class.name) {
        catalog.register_complex_type(referenced, ComplexType::new(class.name));
        return Ok(());
    }

    debug!(name = %class.name, referenced, "discovered complex type");

    let mut complex = ComplexType::new(class.name.clone());
    complex.doc = class.doc.clone();
    catalog.register_complex_type(referenced, complex);

    let mut fields = Vec::new();

    for property in &class.properties {
        let var = match property.doc.as_deref().and_then(comment::var_type) {
            Some(var) => var,
            None => continue,
        };

        if !catalog.contains(&var.type_name) {
            add_complex_type(catalog, &var.type_name, loader)?;
        }

        fields.push(Field::new(property.name.clone(), var.type_name).repeated(var.repeated));
    }

    catalog.set_fields(&class.name, fields);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{ClassInfo, ClassRegistry, MethodInfo, MethodKind, PropertyInfo, Visibility};

    const LOCATION: &str = "http://localhost/calc.php";

    fn calculator() -> ServiceClass {
        ServiceClass::new("app.Calculator")
            .doc("Simple calculator.")
            .method(MethodInfo::new("new").kind(MethodKind::Constructor))
            .method(MethodInfo::new("add").doc(
                "/**\n * Add two numbers.\n * @param float $a\n * @param float $b\n * @return float\n */",
            ))
            .method(MethodInfo::new("divide").doc(
                " Divide two numbers.\n @param float $a The numerator.\n @param float $b The denominator.\n @return float The quotient.",
            ))
            .method(MethodInfo::new("reset").doc(" Clear memory.\n @return void"))
            .method(MethodInfo::new("helper").visibility(Visibility::Private))
            .method(MethodInfo::new("create").with_static(true))
    }

    #[test]
    fn selects_operations() {
        let contract = Discoverer::new(LOCATION)
            .discover(&calculator(), &ClassRegistry::new())
            .unwrap();

        let names: Vec<_> = contract.operations().iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, ["add", "divide", "reset"]);
        assert_eq!(contract.service_name(), "Calculator");
        assert_eq!(contract.namespace(), LOCATION);
        assert_eq!(contract.documentation(), Some("Simple calculator."));
    }

    #[test]
    fn operation_details() {
        let contract = Discoverer::new(LOCATION)
            .namespace("urn:calc")
            .discover(&calculator(), &ClassRegistry::new())
            .unwrap();

        let divide = contract.operation("divide").unwrap();
        assert_eq!(divide.documentation, "Divide two numbers.");
        assert_eq!(divide.input[0].name, "a");
        assert_eq!(divide.input[1].docs, "The denominator.");
        assert_eq!(divide.output.as_ref().unwrap().type_name, "float");
        assert!(contract.operation("reset").unwrap().is_void());
        assert_eq!(contract.namespace(), "urn:calc");
        assert!(contract.complex_types().is_empty());
    }

    #[test]
    fn undocumented_method_is_void_without_params() {
        let class = ServiceClass::new("Echo").method(MethodInfo::new("ping"));
        let contract = Discoverer::new(LOCATION)
            .discover(&class, &ClassRegistry::new())
            .unwrap();

        let ping = contract.operation("ping").unwrap();
        assert!(ping.input.is_empty());
        assert!(ping.is_void());
    }

    fn employees() -> ClassRegistry {
        ClassRegistry::new()
            .with_class(
                ClassInfo::new("app.types.Employee")
                    .property(PropertyInfo::new("name").doc("@var string"))
                    .property(PropertyInfo::new("manager").doc("@var Employee"))
                    .property(PropertyInfo::new("company").doc("@var Company"))
                    .property(PropertyInfo::new("scratch")),
            )
            .with_class(
                ClassInfo::new("app.types.Company")
                    .property(PropertyInfo::new("name").doc("@var string"))
                    .property(PropertyInfo::new("staff").doc("@var Employee[]")),
            )
    }

    #[test]
    fn recursive_types_terminate_with_one_entry_each() {
        let class = ServiceClass::new("app.Employees")
            .method(MethodInfo::new("find").doc("@param string $name\n@return Employee"))
            .method(MethodInfo::new("list").doc("@return Employee[]"));

        let contract = Discoverer::new(LOCATION)
            .add_class_path("app.types")
            .discover(&class, &employees())
            .unwrap();

        let names: Vec<_> = contract
            .complex_types()
            .iter()
            .map(|complex| complex.name.as_str())
            .collect();
        assert_eq!(names, ["app.types.Employee", "app.types.Company"]);

        let employee = contract.complex_type("Employee").unwrap();
        let fields: Vec<_> = employee.fields.iter().map(|field| field.name.as_str()).collect();
        assert_eq!(fields, ["name", "manager", "company"]);

        let company = contract.complex_type("Company").unwrap();
        assert!(company.has_repeated_fields());
        assert_eq!(contract.class_map()["Employee"], "app.types.Employee");
    }

    #[test]
    fn unresolved_parameter_type_fails() {
        let class = ServiceClass::new("Svc").method(MethodInfo::new("get").doc("@return Missing"));
        let error = Discoverer::new(LOCATION)
            .discover(&class, &ClassRegistry::new())
            .unwrap_err();

        assert!(matches!(error, Error::UnresolvedType(ref name) if name == "Missing"));
    }
}
